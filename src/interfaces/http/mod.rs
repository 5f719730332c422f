use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{
    dev::Server, error::InternalError, get, http::StatusCode, post, web, App, HttpResponse,
    HttpServer, Responder,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use validator::{Validate, ValidationErrors};

use crate::application::use_cases::automation::AutomationUseCase;
use crate::application::use_cases::test_steps::TestStepsUseCase;
use crate::application::use_cases::user_story::UserStoryUseCase;
use crate::domain::clock::{iso_timestamp, Clock};
use crate::domain::error::{AppError, Result};
use crate::domain::test_case::TestCase;
use crate::domain::upload::UploadedFile;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::csv::RecordStore;
use crate::interfaces::ws::{self, RelayFrame};

const MAX_LOG_ENTRIES: usize = 100;
const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub user_stories: Arc<UserStoryUseCase>,
    pub test_steps: Arc<TestStepsUseCase>,
    pub automation: Arc<AutomationUseCase>,
    pub clock: Arc<dyn Clock>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
    pub relay: broadcast::Sender<RelayFrame>,
}

impl HttpState {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, relay_capacity: usize) -> Self {
        Self {
            user_stories: Arc::new(UserStoryUseCase::new(store.clone(), clock.clone())),
            test_steps: Arc::new(TestStepsUseCase::new(store.clone(), clock.clone())),
            automation: Arc::new(AutomationUseCase::new(store, clock.clone())),
            clock,
            logs: Arc::new(Mutex::new(Vec::new())),
            relay: ws::relay_channel(relay_capacity),
        }
    }

    fn timestamp(&self) -> String {
        iso_timestamp(&self.clock.now())
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestCasesRequest {
    #[validate(required(message = "User story is required and cannot be empty"))]
    pub user_story: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestStepsRequest {
    #[validate(
        required(message = "Test cases are required"),
        length(min = 1, message = "Test cases are required")
    )]
    pub test_cases: Option<Vec<String>>,
    #[serde(default)]
    pub user_story: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAutomationRequest {
    #[validate(
        required(message = "Detailed test cases are required"),
        length(min = 1, message = "Detailed test cases are required")
    )]
    pub detailed_test_cases: Option<Vec<TestCase>>,
    #[serde(default)]
    pub user_story: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[validate(
        required(message = "File content and name are required"),
        length(min = 1, message = "File content and name are required")
    )]
    pub file_content: Option<String>,
    #[validate(
        required(message = "File content and name are required"),
        length(min = 1, message = "File content and name are required")
    )]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl UploadRequest {
    fn into_file(self) -> UploadedFile {
        UploadedFile {
            content: self.file_content.unwrap_or_default(),
            name: self.file_name.unwrap_or_default(),
            file_type: self.file_type,
        }
    }
}

/// Success envelope; `body` fields are flattened next to `success`.
#[derive(Serialize)]
struct Success<T: Serialize> {
    success: bool,
    message: String,
    #[serde(flatten)]
    body: T,
    timestamp: String,
}

fn ok<T: Serialize>(data: &HttpState, message: impl Into<String>, body: T) -> HttpResponse {
    HttpResponse::Ok().json(Success {
        success: true,
        message: message.into(),
        body,
        timestamp: data.timestamp(),
    })
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
}

fn status_of(err: &AppError) -> StatusCode {
    match err.root() {
        AppError::ValidationError(_) | AppError::PreconditionNotMet(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_response(err: &AppError) -> HttpResponse {
    let (message, details) = err.describe();
    HttpResponse::build(status_of(err)).json(Failure {
        success: false,
        error: err.code(),
        message,
        details,
        stage: err.stage().map(str::to_string),
    })
}

/// Logs the failure to both sinks and renders it.
fn fail(data: &HttpState, action: &str, err: AppError) -> HttpResponse {
    let status = status_of(&err);
    if status.is_server_error() {
        tracing::error!(action, error = %err, stage = err.stage(), "Request failed");
    } else {
        tracing::warn!(action, error = %err, "Request rejected");
    }
    add_log(
        &data.logs,
        if status.is_server_error() { "ERROR" } else { "WARN" },
        "HttpApi",
        &format!("{} failed: {}", action, err),
    );
    failure_response(&err)
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

fn validate<T: Validate>(req: &T) -> Result<()> {
    req.validate()
        .map_err(|errors| AppError::ValidationError(validation_message(&errors)))
}

/// Runs file-bound use-case work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

#[post("/generate-testcases")]
async fn generate_testcases(
    data: web::Data<HttpState>,
    req: web::Json<GenerateTestCasesRequest>,
) -> impl Responder {
    let action = "Generate test cases";
    if let Err(e) = validate(&*req) {
        return fail(&data, action, e);
    }
    let story = req.into_inner().user_story.unwrap_or_default();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Generating test cases for story ({} chars)", story.chars().count()),
    );

    let use_case = data.user_stories.clone();
    match blocking(move || use_case.submit(&story)).await {
        Ok(outcome) => {
            let message = if outcome.duplicate {
                "User story already exists; test cases generated"
            } else {
                "User story saved and test cases generated"
            };
            ok(&data, message, outcome)
        }
        Err(e) => fail(&data, action, e),
    }
}

#[post("/create-test-steps")]
async fn create_test_steps(
    data: web::Data<HttpState>,
    req: web::Json<CreateTestStepsRequest>,
) -> impl Responder {
    let action = "Create test steps";
    if let Err(e) = validate(&*req) {
        return fail(&data, action, e);
    }
    let req = req.into_inner();
    let names = req.test_cases.unwrap_or_default();
    let story = req.user_story.unwrap_or_default();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Creating detailed steps for {} test cases", names.len()),
    );

    let use_case = data.test_steps.clone();
    match blocking(move || use_case.generate_steps(&names, &story)).await {
        Ok(outcome) => {
            let message = format!(
                "Detailed test steps created for {} test cases ({} steps)",
                outcome.total_test_cases, outcome.total_steps
            );
            ok(&data, message, outcome)
        }
        Err(e) => fail(&data, action, e),
    }
}

#[post("/generate-automation-from-steps")]
async fn generate_automation(
    data: web::Data<HttpState>,
    req: web::Json<GenerateAutomationRequest>,
) -> impl Responder {
    let action = "Generate automation";
    if let Err(e) = validate(&*req) {
        return fail(&data, action, e);
    }
    let req = req.into_inner();
    let cases = req.detailed_test_cases.unwrap_or_default();
    let story = req.user_story;
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Generating automation code for {} test cases", cases.len()),
    );

    let use_case = data.automation.clone();
    match blocking(move || use_case.generate_code(&cases, story.as_deref())).await {
        Ok(outcome) => ok(
            &data,
            "Java Playwright automation code generated and saved successfully",
            outcome,
        ),
        Err(e) => fail(&data, action, e),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoryList<T: Serialize> {
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    user_stories: T,
}

#[get("/user-stories")]
async fn list_user_stories(data: web::Data<HttpState>) -> impl Responder {
    let use_case = data.user_stories.clone();
    match blocking(move || use_case.list()).await {
        Ok(stories) => ok(
            &data,
            format!("Retrieved {} user stories", stories.len()),
            StoryList {
                count: stories.len(),
                category: None,
                user_stories: stories,
            },
        ),
        Err(e) => fail(&data, "List user stories", e),
    }
}

#[get("/user-stories/category/{category}")]
async fn list_user_stories_by_category(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> impl Responder {
    let category = path.into_inner();
    let use_case = data.user_stories.clone();
    let wanted = category.clone();
    match blocking(move || use_case.list_by_category(&wanted)).await {
        Ok(stories) => ok(
            &data,
            format!("Retrieved {} user stories in {}", stories.len(), category),
            StoryList {
                count: stories.len(),
                category: Some(category),
                user_stories: stories,
            },
        ),
        Err(e) => fail(&data, "List user stories by category", e),
    }
}

#[post("/upload-userstory")]
async fn upload_user_story(
    data: web::Data<HttpState>,
    req: web::Json<UploadRequest>,
) -> impl Responder {
    let action = "Upload user story";
    if let Err(e) = validate(&*req) {
        return fail(&data, action, e);
    }
    let file = req.into_inner().into_file();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Processing uploaded user story file: {}", file.name),
    );

    let use_case = data.user_stories.clone();
    match blocking(move || use_case.upload(&file)).await {
        Ok(outcome) => ok(
            &data,
            "User story successfully uploaded and saved",
            outcome,
        ),
        Err(e) => fail(&data, action, e),
    }
}

#[post("/upload-testcases")]
async fn upload_test_cases(
    data: web::Data<HttpState>,
    req: web::Json<UploadRequest>,
) -> impl Responder {
    let action = "Upload test cases";
    if let Err(e) = validate(&*req) {
        return fail(&data, action, e);
    }
    let file = req.into_inner().into_file();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Processing uploaded test cases file: {}", file.name),
    );

    let use_case = data.test_steps.clone();
    match blocking(move || use_case.upload_test_cases(&file)).await {
        Ok(outcome) => ok(
            &data,
            format!(
                "{} test cases successfully uploaded and saved",
                outcome.test_cases.len()
            ),
            outcome,
        ),
        Err(e) => fail(&data, action, e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|p| p.into_inner());
    HttpResponse::Ok().json(&*logs)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "UP" }))
}

/// Malformed or oversized JSON bodies get the standard failure body.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            let app_err = AppError::ValidationError(format!("Invalid request body: {}", err));
            let response = failure_response(&app_err);
            InternalError::from_response(err, response).into()
        })
}

/// Registers every route; shared by the server and the route tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health)
        .service(ws::relay)
        .service(
            web::scope("/api")
                .service(generate_testcases)
                .service(create_test_steps)
                .service(generate_automation)
                .service(list_user_stories)
                .service(list_user_stories_by_category)
                .service(upload_user_story)
                .service(upload_test_cases)
                .service(get_logs),
        );
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|p| p.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn start_server(config: &ServerConfig, state: HttpState) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    add_log(
        &state.logs,
        "INFO",
        "HttpApi",
        &format!("Listening on {}:{}", config.host, config.port),
    );

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
