use std::rc::Rc;

use gloo::net::http::Request;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::{gallery_view::GalleryView, project_detail::ProjectDetail};
use crate::error::GalleryError;
use crate::model::{GallerySettings, ProjectCatalog};
use crate::util::{clog, cwarn};

const SETTINGS_KEY: &str = "gallery_settings";

#[derive(PartialEq, Clone)]
enum View {
    Gallery,
    Project(String),
}

fn load_settings() -> GallerySettings {
    let raw = web_sys::window()
        .and_then(|win| win.local_storage().ok().flatten())
        .and_then(|store| store.get_item(SETTINGS_KEY).ok().flatten());
    GallerySettings::from_override(raw.as_deref())
}

async fn fetch_catalog(url: &str) -> Result<ProjectCatalog, GalleryError> {
    let response = Request::get(url).send().await?;
    if !response.ok() {
        return Err(GalleryError::Fetch(format!("{url} answered {}", response.status())));
    }
    let body = response.text().await?;
    ProjectCatalog::from_json(&body)
}

#[function_component(App)]
pub fn app() -> Html {
    let view = use_state(|| View::Gallery);
    let settings = use_memo((), |_| load_settings());
    let catalog = use_state(|| Rc::new(ProjectCatalog::default()));

    // Load project content once; until then the gallery shows an empty canvas.
    {
        let catalog = catalog.clone();
        let url = settings.content_url.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_catalog(&url).await {
                    Ok(loaded) => {
                        clog(&format!("loaded {} projects from {url}", loaded.len()));
                        catalog.set(Rc::new(loaded));
                    }
                    Err(err) => cwarn(&format!("{err}; showing an empty gallery")),
                }
            });
            || ()
        });
    }

    let to_project = {
        let view = view.clone();
        Callback::from(move |id: String| view.set(View::Project(id)))
    };
    let to_gallery = {
        let view = view.clone();
        Callback::from(move |_| view.set(View::Gallery))
    };

    match &*view {
        View::Gallery => html! {
            <GalleryView
                catalog={(*catalog).clone()}
                settings={settings.clone()}
                on_navigate={to_project}
            />
        },
        View::Project(id) => {
            let found = catalog.find(id);
            let caption = found
                .map(|(index, project)| catalog.caption(index, project.cover_image()))
                .unwrap_or_default();
            html! {
                <ProjectDetail
                    project={found.map(|(_, project)| project.clone())}
                    caption={caption}
                    on_back={to_gallery}
                />
            }
        }
    }
}
