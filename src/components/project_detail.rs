use crate::model::ProjectRecord;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ProjectDetailProps {
    /// `None` when the requested id is not in the catalog.
    pub project: Option<ProjectRecord>,
    pub caption: String,
    pub on_back: Callback<()>,
}

#[function_component]
pub fn ProjectDetail(props: &ProjectDetailProps) -> Html {
    let back_btn = {
        let cb = props.on_back.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let back = html! {
        <button onclick={back_btn} style="background:none; border:1px solid #444; color:#e6e6e6; padding:6px 14px; border-radius:4px; cursor:pointer;">
            {"← Back to gallery"}
        </button>
    };
    let Some(project) = &props.project else {
        return html! {
            <div style="padding:48px; color:#e6e6e6; background:#0b0b0b; min-height:100vh;">
                { back }
                <p style="margin-top:24px; opacity:0.7;">{"Project not found."}</p>
            </div>
        };
    };

    html! {
        <div style="padding:48px; color:#e6e6e6; background:#0b0b0b; min-height:100vh; box-sizing:border-box;">
            { back }
            <header style="margin:32px 0 24px 0; display:flex; align-items:baseline; gap:16px;">
                <h1 style="margin:0; font-weight:500;">{ project.title.clone() }</h1>
                if !project.year.is_empty() {
                    <span style="opacity:0.6;">{ project.year.clone() }</span>
                }
                <span style="margin-left:auto; opacity:0.6;">{ props.caption.clone() }</span>
            </header>
            if !project.description.is_empty() {
                <p style="max-width:720px; line-height:1.6; opacity:0.85;">{ project.description.clone() }</p>
            }
            <div style="display:grid; grid-template-columns:repeat(auto-fill, minmax(320px, 1fr)); gap:24px; margin-top:32px;">
                { for project.images.iter().map(|src| html! {
                    <img src={src.clone()} alt={project.title.clone()} style="width:100%; display:block;" />
                }) }
            </div>
        </div>
    }
}
