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

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::model::Sentiment;

/// Request and prediction counters of the serving process, backed by a
/// dedicated registry so the exposition contains exactly these series.
pub struct AppMetrics {
    registry: Registry,
    request_count: IntCounterVec,
    request_latency: HistogramVec,
    prediction_count: IntCounterVec,
}

impl AppMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let request_count = IntCounterVec::new(
            Opts::new("app_request_count", "Requests by method and endpoint"),
            &["method", "endpoint"],
        )?;
        let request_latency = HistogramVec::new(
            HistogramOpts::new(
                "app_request_latency_seconds",
                "Request latency by endpoint",
            ),
            &["endpoint"],
        )?;
        let prediction_count = IntCounterVec::new(
            Opts::new("model_prediction_count", "Predictions by class"),
            &["prediction"],
        )?;

        registry.register(Box::new(request_count.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;
        registry.register(Box::new(prediction_count.clone()))?;

        Ok(Self {
            registry,
            request_count,
            request_latency,
            prediction_count,
        })
    }

    pub fn observe_request(&self, method: &str, endpoint: &str, seconds: f64) {
        self.request_count
            .with_label_values(&[method, endpoint])
            .inc();
        self.request_latency
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    pub fn count_prediction(&self, sentiment: Sentiment) {
        self.prediction_count
            .with_label_values(&[sentiment.as_str()])
            .inc();
    }

    /// Prometheus text exposition of everything this process collects.
    pub fn exposition(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use super::AppMetrics;
    use crate::model::Sentiment;

    #[test]
    fn observed_series_show_up_in_the_exposition() {
        let metrics = AppMetrics::new().unwrap();
        metrics.observe_request("POST", "/predict", 0.01);
        metrics.count_prediction(Sentiment::Positive);
        metrics.count_prediction(Sentiment::Positive);
        metrics.count_prediction(Sentiment::Negative);

        let exposition = metrics.exposition().unwrap();
        assert!(exposition
            .contains("app_request_count{endpoint=\"/predict\",method=\"POST\"} 1"));
        assert!(exposition.contains("app_request_latency_seconds_count{endpoint=\"/predict\"} 1"));
        assert!(exposition.contains("model_prediction_count{prediction=\"positive\"} 2"));
        assert!(exposition.contains("model_prediction_count{prediction=\"negative\"} 1"));
    }

    #[test]
    fn an_untouched_collector_has_no_series() {
        let metrics = AppMetrics::new().unwrap();
        assert!(!metrics.exposition().unwrap().contains("model_prediction_count{"));
    }
}
