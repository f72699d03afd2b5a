mod components;
mod dom;
mod error;
mod expansion;
mod frame;
mod gallery;
mod grid;
mod model;
mod render_loop;
mod scene;
mod state;
#[cfg(test)]
mod testing;
mod tween;
mod util;
mod virtualizer;

use components::app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
