use proto::prelude::{WriteSignal, WRITE_SUCCESS};
use tide::http::mime;
use tide::{Request, Response, StatusCode};

use super::super::script::Script;
use super::super::validate;
use super::state::AppState;

pub async fn discover(req: Request<AppState>) -> tide::Result<Response> {
    let params = validate::parse_query(req.url().query().unwrap_or_default());
    let script = req.state().stage.discover(&params).await;
    Ok(ScriptResponder::from(script).respond())
}

pub async fn chain(req: Request<AppState>) -> tide::Result<Response> {
    let params = validate::parse_query(req.url().query().unwrap_or_default());
    let script = req.state().stage.chain(&params).await;
    Ok(ScriptResponder::from(script).respond())
}

pub async fn write(req: Request<AppState>) -> tide::Result<Response> {
    let params = validate::parse_query(req.url().query().unwrap_or_default());
    let signal = req.state().stage.write(&params).await;
    Ok(ScriptResponder::from(signal).respond())
}

enum ScriptResponder {
    Script(Script),
    Write(WriteSignal),
}

impl ScriptResponder {
    fn respond(self) -> Response {
        match self {
            ScriptResponder::Script(script) => Response::builder(StatusCode::Ok)
                .body(script.body)
                .content_type(mime::PLAIN)
                .build(),
            ScriptResponder::Write(WriteSignal::Written) => Response::builder(StatusCode::Ok)
                .body(WRITE_SUCCESS)
                .content_type(mime::PLAIN)
                .build(),
            // nothing for the client to act on, the status is the whole answer
            ScriptResponder::Write(WriteSignal::Failed) => {
                Response::builder(StatusCode::BadGateway).build()
            }
        }
    }
}

impl From<Script> for ScriptResponder {
    fn from(script: Script) -> Self {
        ScriptResponder::Script(script)
    }
}

impl From<WriteSignal> for ScriptResponder {
    fn from(signal: WriteSignal) -> Self {
        ScriptResponder::Write(signal)
    }
}
