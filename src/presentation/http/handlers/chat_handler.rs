use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::{Stream, StreamExt, channel::mpsc};
use std::{sync::Arc, time::Duration};

use crate::application::use_cases::ChatUseCase;
use crate::presentation::http::dto::ChatRequestDto;
use crate::presentation::http::errors::AppError;

pub struct ChatHandler {
    chat_use_case: Arc<ChatUseCase>,
}

impl ChatHandler {
    pub fn new(chat_use_case: Arc<ChatUseCase>) -> Self {
        Self { chat_use_case }
    }

    /// Streams the tool loop as server-sent events, one event per step
    /// update, named after the event type.
    pub async fn chat(
        State(handler): State<Arc<ChatHandler>>,
        payload: Result<Json<ChatRequestDto>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = payload?;
        handler.chat_use_case.validate(&request.messages)?;

        let (sender, receiver) = mpsc::unbounded();
        let use_case = handler.chat_use_case.clone();
        tokio::spawn(async move {
            use_case.run(request.messages, sender).await;
        });

        let stream = receiver.map(|event| Event::default().event(event.name()).json_data(&event));

        Ok(create_sse_response(stream))
    }
}

pub fn create_sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Event, axum::Error>> + Send + 'static,
{
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
        .into_response()
}
