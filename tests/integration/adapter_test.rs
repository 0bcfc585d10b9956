//! Integration tests for the compiler event adapter against a foreign host.

use std::time::Duration;

use serde_json::json;

use builder_plugin::prelude::*;

use crate::helpers::ForeignHost;

#[test]
fn test_binds_by_static_discipline() {
    let host = ForeignHost::new(&["done", "shouldEmit", "compilation"]);
    let descriptor = CompilerEventDescriptor::new()
        .name("ForeignPlugin")
        .on("done", Handler::returning(|_| Ok(None)))
        .on("should-emit", Handler::returning(|_| Ok(None)))
        .on("compilation", Handler::returning(|_| Ok(None)))
        .on("run", Handler::returning(|_| Ok(None)))
        .on("bogus", Handler::returning(|_| Ok(None)));

    let mut adapter: CompilerEvent = CompilerEvent::new(descriptor);
    let report = adapter.apply(&host).unwrap();

    assert_eq!(report.bound_count(), 3);
    assert_eq!(report.skipped, vec!["run", "bogus"]);
    assert_eq!(host.hooks["done"].series.lock().unwrap().len(), 1);
    assert_eq!(host.hooks["shouldEmit"].sync.lock().unwrap().len(), 1);
    assert_eq!(host.hooks["compilation"].sync.lock().unwrap().len(), 1);
    assert_eq!(
        host.hooks["done"].series.lock().unwrap()[0].0,
        "ForeignPlugin"
    );
}

#[test]
fn test_second_apply_registers_nothing() {
    let host = ForeignHost::new(&["done"]);
    let descriptor = CompilerEventDescriptor::new().on("done", Handler::returning(|_| Ok(None)));
    let mut adapter: CompilerEvent = CompilerEvent::new(descriptor);

    adapter.apply(&host).unwrap();
    let err = adapter.apply(&host).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Plugin);
    assert_eq!(host.hooks["done"].series.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sink_called_during_handler_beats_slow_future() {
    let host = ForeignHost::new(&["done"]);
    let handler: Handler = Handler::new(|invocation| {
        invocation.sink.resolve(json!("sink"));
        Ok(HandlerOutput::Future(Box::pin(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Some(json!("future")))
        })))
    });
    CompilerEvent::new(CompilerEventDescriptor::new().on("done", handler))
        .apply(&host)
        .unwrap();

    let calls = host.hooks["done"].call_first_async(vec![json!({})]).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].as_ref().unwrap(), &Some(json!("sink")));
}

#[tokio::test(start_paused = true)]
async fn test_throw_reported_once() {
    let host = ForeignHost::new(&["emit"]);
    let handler: Handler = Handler::new(|invocation| {
        let sink = invocation.sink;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            sink.finish();
        });
        Err(AppError::hook("emit blew up"))
    });
    CompilerEvent::new(CompilerEventDescriptor::new().on("emit", handler))
        .apply(&host)
        .unwrap();

    let calls = host.hooks["emit"].call_first_async(Vec::new()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].as_ref().unwrap_err().is(ErrorKind::Hook));
}

#[test]
fn test_sync_listener_prefers_return_over_sink() {
    let host = ForeignHost::new(&["entryOption"]);
    let handler: Handler = Handler::returning(|invocation| {
        invocation.sink.resolve(json!("from sink"));
        Ok(Some(json!("from return")))
    });
    CompilerEvent::new(CompilerEventDescriptor::new().on("entry-option", handler))
        .apply(&host)
        .unwrap();

    let listener = host.hooks["entryOption"].sync.lock().unwrap()[0].1.clone();
    assert_eq!(listener(&[]).unwrap(), Some(json!("from return")));
}
