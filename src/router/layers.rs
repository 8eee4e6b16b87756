use tower_http::{
	classify::{ServerErrorsAsFailures, SharedClassifier},
	trace::TraceLayer,
};

pub(crate) fn trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
	TraceLayer::new_for_http()
}
