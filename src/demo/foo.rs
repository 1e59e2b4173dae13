use crate::http::{Handler, HandlerFuture, Request, Response, ResponseSender, Status};

pub const FOO_PATH: &str = "/action/foo";

/// Describes a foo from the `name`, `age` and `gender` query parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct FooAction;

impl Handler for FooAction {
    fn get<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        Box::pin(async move {
            let name = request.query_param("name")?;
            let age = request.query_param("age")?;
            let gender = request.query_param("gender")?;

            let response = Response::builder()
                .text(format!(
                    "We have a {gender} foo named {name} who is {age} years old"
                ))
                .status(Status::Ok)
                .build();
            sender.send(response).await
        })
    }
}
