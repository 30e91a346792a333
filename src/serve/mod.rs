// Copyright 2025.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The prediction endpoint.
//!
//! All state is resolved and loaded before the listener binds. A missing or
//! unreadable artifact aborts startup; nothing is loaded per request.

pub mod metrics;

use std::time::Instant;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, ResponseError};
use serde::Deserialize;
use thiserror::Error;

use crate::bow::{CountVectorizer, VectorizerError};
use crate::config::{Configs, EnvironmentError};
use crate::model::{
    classifier::Sentiment, train, LibLinearError, ModelStageError, SentimentClassifier,
};
use crate::registry::{ModelRegistry, RegistryError, Stage};
use crate::serve::metrics::AppMetrics;
use crate::text::{LanguageResources, ResourceError};

const PAGE_TEMPLATE: &str = include_str!("../../templates/index.html");
const RESULT_MARKER: &str = "<!--RESULT-->";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Model(#[from] ModelStageError),
    #[error(transparent)]
    Vectorizer(#[from] VectorizerError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Metrics(#[from] prometheus::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("model {model:?} has no servable version")]
    NoServableVersion { model: String },
    #[error("version {version} of {model:?} is missing artifact {artifact:?}")]
    MissingArtifact {
        model: String,
        version: u32,
        artifact: String,
    },
}

#[derive(Debug, Error)]
enum AppResponseError {
    #[error(transparent)]
    Prediction(#[from] LibLinearError),
    #[error(transparent)]
    Metrics(#[from] prometheus::Error),
}

impl ResponseError for AppResponseError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppResponseError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppResponseError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Immutable serving state, built once before the listener binds.
struct AppState {
    classifier: SentimentClassifier,
    metrics: AppMetrics,
}

#[derive(Debug, Deserialize)]
struct PredictForm {
    text: String,
}

async fn home(state: web::Data<AppState>) -> HttpResponse {
    let started = Instant::now();
    let body = render_page(None);
    state
        .metrics
        .observe_request("GET", "/", started.elapsed().as_secs_f64());
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

async fn predict(
    state: web::Data<AppState>,
    form: web::Form<PredictForm>,
) -> Result<HttpResponse, AppResponseError> {
    let started = Instant::now();
    let sentiment = state.classifier.predict(&form.text)?;
    state.metrics.count_prediction(sentiment);
    state
        .metrics
        .observe_request("POST", "/predict", started.elapsed().as_secs_f64());
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_page(Some(sentiment))))
}

async fn metrics_page(state: web::Data<AppState>) -> Result<HttpResponse, AppResponseError> {
    let started = Instant::now();
    let body = state.metrics.exposition()?;
    state
        .metrics
        .observe_request("GET", "/metrics", started.elapsed().as_secs_f64());
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4; charset=utf-8")
        .body(body))
}

fn render_page(result: Option<Sentiment>) -> String {
    match result {
        Some(sentiment) => PAGE_TEMPLATE.replace(
            RESULT_MARKER,
            &format!(
                "<p class=\"result\">This review is <strong>{}</strong>.</p>",
                sentiment.as_str()
            ),
        ),
        None => PAGE_TEMPLATE.to_string(),
    }
}

/// Resolves the servable model version: `Staging` when present, otherwise the
/// newest unstaged version.
fn resolve_version(
    registry: &ModelRegistry,
    model: &str,
) -> Result<crate::registry::ModelVersion, ServeError> {
    if let Some(entry) = registry.latest_version(model, Stage::Staging)? {
        return Ok(entry);
    }
    registry
        .latest_version(model, Stage::None)?
        .ok_or_else(|| ServeError::NoServableVersion {
            model: model.to_string(),
        })
}

fn build_state(configs: &Configs) -> Result<AppState, ServeError> {
    let model_name = &configs.params().model_training.model_name;
    let registry = ModelRegistry::open(configs.environment().registry_uri()?)?;
    let entry = resolve_version(&registry, model_name)?;
    log::info!(
        "Serving {model_name} version {} ({})",
        entry.version,
        entry.stage
    );

    let artifact = |name: String| -> Result<camino::Utf8PathBuf, ServeError> {
        let path = registry.artifact_path(model_name, entry.version, &name);
        if !path.exists() {
            return Err(ServeError::MissingArtifact {
                model: model_name.clone(),
                version: entry.version,
                artifact: name,
            });
        }
        Ok(path)
    };

    let model = train::load_model(artifact(format!("{model_name}.model"))?)?;
    let vectorizer = CountVectorizer::load(artifact(format!(
        "{}.bin",
        configs.params().feature_engineering.vectorizer_name
    ))?)?;

    let resources = LanguageResources::load(
        &configs.params().resources.stop_words,
        &configs.params().resources.lemmas,
    )?;
    let normalizer = resources.normalizer()?;

    Ok(AppState {
        classifier: SentimentClassifier::new(model, vectorizer, normalizer),
        metrics: AppMetrics::new()?,
    })
}

/// Loads the artifacts, binds and serves until interrupted.
pub fn run(configs: &Configs) -> Result<(), ServeError> {
    let state = web::Data::new(build_state(configs)?);
    let serving = configs.params().serving.clone();
    log::info!("Listening on {}:{}", serving.host, serving.port);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/", web::get().to(home))
                .route("/predict", web::post().to(predict))
                .route("/metrics", web::get().to(metrics_page))
        })
        .bind((serving.host.as_str(), serving.port))?
        .run()
        .await
    })?;
    Ok(())
}

#[cfg(test)]
mod test {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use camino::Utf8PathBuf;

    use super::{
        build_state, home, metrics_page, predict, render_page, resolve_version, ServeError,
    };
    use crate::bow::CountVectorizer;
    use crate::config::{Configs, EnvironmentConfig, Params, PathsConfig};
    use crate::model::classifier::Sentiment;
    use crate::model::train::{save_model, train_from_rows};
    use crate::registry::{ModelRegistry, Stage};

    fn temp_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    /// Trains a tiny model, registers it and returns configs pointing at it.
    fn prepared_configs(dir: &tempfile::TempDir) -> Configs {
        let root = temp_root(dir);
        let paths = PathsConfig::new(&root);
        let params = Params::default();

        let corpus = ["wonderful movie", "terrible movie"];
        let vectorizer = CountVectorizer::fit(corpus, 100);
        let mut rows = Vec::new();
        for _ in 0..20 {
            rows.push(crate::bow::engineering::FeatureRow {
                features: vectorizer.transform("wonderful movie"),
                label: 1,
            });
            rows.push(crate::bow::engineering::FeatureRow {
                features: vectorizer.transform("terrible movie"),
                label: 0,
            });
        }
        let model = train_from_rows(&rows, 1.0).unwrap();

        let model_file = paths.model_file(&params.model_training.model_name);
        save_model(&model, &model_file).unwrap();
        let vectorizer_file = paths.vectorizer_file(&params.feature_engineering.vectorizer_name);
        vectorizer.save(&vectorizer_file).unwrap();

        let registry_root = root.join("registry");
        let registry = ModelRegistry::open(&registry_root).unwrap();
        registry
            .register(
                &params.model_training.model_name,
                None,
                &[model_file, vectorizer_file],
            )
            .unwrap();

        let environment = EnvironmentConfig::for_test(None, Some(registry_root));
        Configs::new(paths, environment, params)
    }

    #[actix_web::test]
    async fn the_full_serving_path_classifies_form_input() {
        let dir = tempfile::tempdir().unwrap();
        let configs = prepared_configs(&dir);
        let state = web::Data::new(build_state(&configs).unwrap());

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .route("/", web::get().to(home))
                .route("/predict", web::post().to(predict))
                .route("/metrics", web::get().to(metrics_page)),
        )
        .await;

        let response = test::TestRequest::get().uri("/").send_request(&app).await;
        assert_eq!(response.status(), StatusCode::OK);

        let request = test::TestRequest::post()
            .uri("/predict")
            .set_form([("text", "A truly WONDERFUL movie!!!")])
            .to_request();
        let body = test::call_and_read_body(&app, request).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<strong>positive</strong>"), "{body}");

        let request = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, request).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("model_prediction_count{prediction=\"positive\"} 1"));
        assert!(body.contains("app_request_count"));
    }

    #[actix_web::test]
    async fn startup_fails_when_nothing_is_registered() {
        let dir = tempfile::tempdir().unwrap();
        let root = temp_root(&dir);
        let configs = Configs::new(
            PathsConfig::new(&root),
            EnvironmentConfig::for_test(None, Some(root.join("registry"))),
            Params::default(),
        );
        assert!(matches!(
            build_state(&configs),
            Err(ServeError::NoServableVersion { .. })
        ));
    }

    #[actix_web::test]
    async fn staging_is_preferred_over_unstaged_versions() {
        let dir = tempfile::tempdir().unwrap();
        let configs = prepared_configs(&dir);
        let registry = ModelRegistry::open(configs.environment().registry_uri().unwrap()).unwrap();
        let model = &configs.params().model_training.model_name;

        let staged = resolve_version(&registry, model).unwrap();
        assert_eq!(staged.stage, Stage::Staging);

        // after demotion the resolver falls back to the unstaged version
        registry.transition(model, staged.version, Stage::None).unwrap();
        let fallback = resolve_version(&registry, model).unwrap();
        assert_eq!(fallback.stage, Stage::None);
    }

    #[actix_web::test]
    async fn the_page_renders_a_result_when_present() {
        assert!(!render_page(None).contains("class=\"result\""));
        assert!(render_page(Some(Sentiment::Negative)).contains("<strong>negative</strong>"));
    }
}
