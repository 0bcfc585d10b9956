//! Integration tests for the compile-done signal.

use std::sync::Arc;

use serde_json::json;

use builder_core::config::BuilderConfig;
use builder_core::events::BuilderEvent;
use builder_plugin::compiler::Stats;
use builder_service::{Builder, BuilderContext, EventEmitter};

use crate::helpers::{ForeignHost, RecordingChannel, TestBuild};

#[tokio::test]
async fn test_clean_build_sends_zero() {
    let channel = Arc::new(RecordingChannel::default());
    let build = TestBuild::new(Some(channel.clone()));
    let mut events = build.builder.subscribe();

    build.compiler.run(Stats::new()).await.unwrap();

    assert_eq!(
        channel.wire_lines(),
        vec![r#"{"type":"compile-done","data":0}"#]
    );
    assert_eq!(
        events.recv().await.unwrap().payload,
        BuilderEvent::CompileDone { code: 0 }
    );
}

#[tokio::test]
async fn test_build_with_errors_sends_one() {
    let channel = Arc::new(RecordingChannel::default());
    let build = TestBuild::new(Some(channel.clone()));

    let stats = Stats::new().with_error("Module not found: ./missing");
    build.compiler.run(stats).await.unwrap();

    assert_eq!(
        channel.wire_lines(),
        vec![r#"{"type":"compile-done","data":1}"#]
    );
}

#[tokio::test]
async fn test_warnings_alone_are_success() {
    let channel = Arc::new(RecordingChannel::default());
    let build = TestBuild::new(Some(channel.clone()));

    build
        .compiler
        .run(Stats::new().with_warning("large bundle"))
        .await
        .unwrap();

    assert_eq!(
        channel.wire_lines(),
        vec![r#"{"type":"compile-done","data":0}"#]
    );
}

#[tokio::test]
async fn test_without_ipc_only_emits_locally() {
    let build = TestBuild::new(None);
    let mut events = build.builder.subscribe();

    build
        .compiler
        .run(Stats::new().with_error("boom"))
        .await
        .unwrap();

    assert_eq!(
        events.recv().await.unwrap().payload,
        BuilderEvent::CompileDone { code: 1 }
    );
}

#[tokio::test]
async fn test_ipc_failure_does_not_fail_build() {
    let build = TestBuild::new(Some(Arc::new(RecordingChannel::failing())));
    let mut events = build.builder.subscribe();

    build.compiler.run(Stats::new()).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap().payload,
        BuilderEvent::CompileDone { code: 0 }
    );
}

#[tokio::test]
async fn test_each_run_signals_once() {
    let channel = Arc::new(RecordingChannel::default());
    let build = TestBuild::new(Some(channel.clone()));

    build.compiler.run(Stats::new()).await.unwrap();
    build
        .compiler
        .run(Stats::new().with_error("second run broke"))
        .await
        .unwrap();

    assert_eq!(
        channel.wire_lines(),
        vec![
            r#"{"type":"compile-done","data":0}"#,
            r#"{"type":"compile-done","data":1}"#,
        ]
    );
}

#[tokio::test]
async fn test_foreign_host_stats_without_build_id() {
    let channel = Arc::new(RecordingChannel::default());
    let context = BuilderContext::new(
        BuilderConfig::default(),
        Arc::new(EventEmitter::new()),
        Some(channel.clone()),
    );
    let mut builder = Builder::with_context(context);
    builder.register_default_services();
    let mut events = builder.subscribe();

    let host = ForeignHost::new(&["done"]);
    assert_eq!(builder.apply_plugins(&host).unwrap(), 1);

    let calls = host.hooks["done"]
        .call_first_async(vec![json!({"errors": ["boom"], "warnings": []})])
        .await;

    {
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_ok());
    }
    assert_eq!(
        channel.wire_lines(),
        vec![r#"{"type":"compile-done","data":1}"#]
    );
    assert_eq!(
        events.recv().await.unwrap().payload,
        BuilderEvent::CompileDone { code: 1 }
    );
}
