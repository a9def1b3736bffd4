pub mod route;
pub mod state;

use proto::prelude::Stage;

pub mod prelude {
    use super::*;
    pub use state::AppState;
}

pub fn app(state: state::AppState) -> tide::Server<state::AppState> {
    let mut app = tide::with_state(state);
    app.at(&path(Stage::Discover)).get(route::discover);
    app.at(&path(Stage::Write)).get(route::write);
    app.at(&path(Stage::Chain)).get(route::chain);
    app
}

fn path(stage: Stage) -> String {
    format!("/{}", stage.endpoint())
}
