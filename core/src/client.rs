//! Single-use asynchronous client for the Inquire API.
//!
//! # Design
//! An `InquireApi` instance performs exactly one call. Its state moves
//! `Idle -> Sending -> {Succeeded, Failed}`, or straight from `Idle` to
//! `Failed` when the arguments do not validate. A second operation on the
//! same instance is refused with `ApiError::ClientBusy` and does not notify:
//! the instance's one notification belongs to its first call. Callers wanting
//! concurrent calls create one instance per call; instances sharing a cloned
//! `ReqwestTransport` also share its session cookie.
//!
//! The client never decodes domain entities. It hands back the parsed JSON
//! object, both through the returned future and through the optional
//! `ApiDelegate`, and the caller decodes it with the acting user id.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::callback::ApiDelegate;
use crate::error::{ApiError, TransportError, ValidationError};
use crate::http::HttpRequest;
use crate::model::{Answer, Question};
use crate::request::{NearbySearch, RequestBuilder};
use crate::response::ApiResponse;
use crate::transport::Transport;
use crate::types::{ApiMethod, CallId, Coordinate, LocationProvider, PaymentTokenSource};

pub type Outcome = Result<ApiResponse, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Sending,
    Succeeded,
    Failed,
}

impl ClientState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClientState::Succeeded | ClientState::Failed)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClientState::Idle => "idle",
            ClientState::Sending => "sending",
            ClientState::Succeeded => "succeeded",
            ClientState::Failed => "failed",
        })
    }
}

pub struct InquireApi<T> {
    id: CallId,
    builder: RequestBuilder,
    transport: T,
    delegate: Option<Arc<dyn ApiDelegate>>,
    state: ClientState,
    method: Option<ApiMethod>,
}

impl<T: Transport> InquireApi<T> {
    pub fn new(builder: RequestBuilder, transport: T) -> Self {
        Self {
            id: CallId::new(),
            builder,
            transport,
            delegate: None,
            state: ClientState::Idle,
            method: None,
        }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn ApiDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// The method this instance was used for, once an operation was invoked.
    pub fn method(&self) -> Option<ApiMethod> {
        self.method
    }

    /// POST /auth. On success the server opens a session and the response
    /// carries the `user` record.
    pub async fn authenticate(&mut self, email: &str, password: &str) -> Outcome {
        self.guard(ApiMethod::Auth)?;
        let request = self.builder.build_auth(email, password);
        self.dispatch(ApiMethod::Auth, request).await
    }

    /// POST /register.
    pub async fn register(&mut self, email: &str, password: &str) -> Outcome {
        self.guard(ApiMethod::Register)?;
        let request = self.builder.build_register(email, password);
        self.dispatch(ApiMethod::Register, request).await
    }

    /// POST /ask with the question text, its location and the payment token.
    pub async fn ask(&mut self, question: &str, location: Coordinate, pay_key: &str) -> Outcome {
        self.guard(ApiMethod::Ask)?;
        let request = self.builder.build_ask(question, Some(location), pay_key);
        self.dispatch(ApiMethod::Ask, request).await
    }

    /// POST /ask, taking the location and payment token from collaborators.
    /// A provider without a value fails validation.
    pub async fn ask_here(
        &mut self,
        question: &str,
        location: &dyn LocationProvider,
        payment: &dyn PaymentTokenSource,
    ) -> Outcome {
        self.guard(ApiMethod::Ask)?;
        let pay_key = payment.payment_token().unwrap_or_default();
        let request = self
            .builder
            .build_ask(question, location.current_location(), &pay_key);
        self.dispatch(ApiMethod::Ask, request).await
    }

    /// POST /answer.
    pub async fn answer(&mut self, question: &Question, answer: &str) -> Outcome {
        self.guard(ApiMethod::Answer)?;
        let request = self.builder.build_answer(question, answer);
        self.dispatch(ApiMethod::Answer, request).await
    }

    /// POST /accept.
    pub async fn accept(&mut self, answer: &Answer) -> Outcome {
        self.guard(ApiMethod::Accept)?;
        let request = self.builder.build_accept(answer);
        self.dispatch(ApiMethod::Accept, request).await
    }

    /// GET /questions near `location`, with the server's default radius.
    pub async fn find_questions_near(&mut self, location: Coordinate) -> Outcome {
        self.find_questions_near_with(location, NearbySearch::default())
            .await
    }

    pub async fn find_questions_near_with(
        &mut self,
        location: Coordinate,
        search: NearbySearch,
    ) -> Outcome {
        self.guard(ApiMethod::ListQuestionsNear)?;
        let request = self
            .builder
            .build_list_questions_near_with(Some(location), search);
        self.dispatch(ApiMethod::ListQuestionsNear, request).await
    }

    /// GET /answers for `question`.
    pub async fn answers_for(&mut self, question: &Question) -> Outcome {
        self.guard(ApiMethod::ListAnswersFor)?;
        let request = self.builder.build_list_answers_for(question);
        self.dispatch(ApiMethod::ListAnswersFor, request).await
    }

    /// GET /logout. Ends the server session.
    pub async fn logout(&mut self) -> Outcome {
        self.guard(ApiMethod::Logout)?;
        let request = self.builder.build_logout();
        self.dispatch(ApiMethod::Logout, Ok(request)).await
    }

    fn guard(&mut self, method: ApiMethod) -> Result<(), ApiError> {
        if self.state != ClientState::Idle {
            warn!(call = %self.id, %method, state = %self.state, "client instance reused");
            return Err(ApiError::ClientBusy {
                method,
                state: self.state,
            });
        }
        self.method = Some(method);
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(call = %self.id, method = %method))]
    async fn dispatch(
        &mut self,
        method: ApiMethod,
        request: Result<HttpRequest, ValidationError>,
    ) -> Outcome {
        let request = match request {
            Ok(request) => request,
            Err(source) => return self.fail(method, ApiError::Validation { method, source }),
        };

        self.state = ClientState::Sending;
        debug!(verb = %request.method, url = %request.url, "sending request");

        let outcome = match self.transport.send(request).await {
            Err(source) => Err(ApiError::Transport { method, source }),
            Ok(response) if !response.is_success() => Err(ApiError::Transport {
                method,
                source: TransportError::Status {
                    status: response.status,
                    body: response.body,
                },
            }),
            Ok(response) => {
                debug!(status = response.status, bytes = response.body.len(), "response received");
                ApiResponse::parse(&response.body)
                    .map_err(|reason| ApiError::Decode { method, reason })
            }
        };

        match outcome {
            Ok(response) => self.succeed(method, response),
            Err(error) => self.fail(method, error),
        }
    }

    fn succeed(&mut self, method: ApiMethod, response: ApiResponse) -> Outcome {
        self.state = ClientState::Succeeded;
        if let Some(delegate) = &self.delegate {
            delegate.request_finished(self.id, method, &response);
        }
        Ok(response)
    }

    fn fail(&mut self, method: ApiMethod, error: ApiError) -> Outcome {
        self.state = ClientState::Failed;
        warn!(%error, "request failed");
        if let Some(delegate) = &self.delegate {
            delegate.request_failed(self.id, method, &error);
        }
        Err(error)
    }
}

impl<T> fmt::Debug for InquireApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InquireApi")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
