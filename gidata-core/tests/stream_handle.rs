use std::collections::BTreeMap;
use std::time::Duration;

use futures::StreamExt;
use gidata_core::stream::StreamHandle;
use gidata_core::{GiDataError, UpdateStream, VariableUpdate};
use gidata_mock::fixtures::{VID, VID_2};
use tokio::sync::{mpsc, oneshot};

fn tick(v: f64) -> VariableUpdate {
    VariableUpdate::new(BTreeMap::from([(VID, v)]))
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_waits_for_graceful_exit() {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (done_tx, done_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let _ = stop_rx.await;
        let _ = done_tx.send(());
    });

    StreamHandle::new(task, stop_tx).stop().await;

    tokio::time::timeout(Duration::from_millis(100), done_rx)
        .await
        .expect("task did not finish after stop()")
        .expect("task was aborted instead of stopped");
}

#[tokio::test]
async fn abort_only_handle_is_aborted_on_stop() {
    let task = tokio::spawn(std::future::pending::<()>());
    let handle = StreamHandle::abort_only(task);
    assert!(!handle.is_finished());
    tokio::time::timeout(Duration::from_millis(200), handle.stop())
        .await
        .expect("abort-only stop hung");
}

#[tokio::test]
async fn dropping_the_handle_signals_stop() {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (seen_tx, seen_rx) = oneshot::channel::<bool>();
    let task = tokio::spawn(async move {
        let stopped = stop_rx.await.is_ok();
        let _ = seen_tx.send(stopped);
    });
    drop(StreamHandle::new(task, stop_tx));
    // the task may be aborted before it observes the signal; both end it
    let _ = tokio::time::timeout(Duration::from_millis(200), seen_rx).await;
}

fn stream_with_producer() -> (UpdateStream, mpsc::Sender<Result<VariableUpdate, GiDataError>>) {
    let (tx, rx) = mpsc::channel(8);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let _ = stop_rx.await;
    });
    (UpdateStream::new(StreamHandle::new(task, stop_tx), rx), tx)
}

#[tokio::test]
async fn updates_flow_until_cancelled() {
    let (mut stream, tx) = stream_with_producer();
    tx.send(Ok(tick(1.0))).await.unwrap();
    tx.send(Ok(tick(2.0))).await.unwrap();

    assert_eq!(stream.recv().await.unwrap().get(&VID), Some(1.0));
    assert_eq!(stream.recv().await.unwrap().get(&VID), Some(2.0));

    tokio::time::timeout(Duration::from_millis(200), stream.cancel())
        .await
        .expect("cancel hung");
    assert!(stream.is_cancelled());
    assert!(tx.is_closed());
    for _ in 0..3 {
        assert_eq!(stream.recv().await.unwrap_err(), GiDataError::Cancelled);
    }
}

#[tokio::test]
async fn remote_close_is_terminal_and_persistent() {
    let (mut stream, tx) = stream_with_producer();
    tx.send(Err(GiDataError::StreamClosed("socket dropped".into())))
        .await
        .unwrap();
    drop(tx);

    for _ in 0..2 {
        match stream.recv().await {
            Err(GiDataError::StreamClosed(reason)) => assert_eq!(reason, "socket dropped"),
            other => panic!("unexpected: {other:?}"),
        }
    }
    assert!(stream.is_closed());
}

#[tokio::test]
async fn producer_errors_are_not_terminal() {
    let (mut stream, tx) = stream_with_producer();
    tx.send(Err(GiDataError::data("bad frame"))).await.unwrap();
    tx.send(Ok(tick(3.0))).await.unwrap();

    assert!(matches!(stream.recv().await, Err(GiDataError::Data(_))));
    assert_eq!(stream.recv().await.unwrap().get(&VID), Some(3.0));
    assert!(!stream.is_closed());
}

#[tokio::test]
async fn as_futures_stream_ends_after_terminal_error() {
    let (stream, tx) = stream_with_producer();
    tx.send(Ok(tick(4.0))).await.unwrap();
    drop(tx);

    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(GiDataError::StreamClosed(_))));
}

#[test]
fn retain_only_filters_ticks() {
    let t = VariableUpdate::new(BTreeMap::from([(VID, 1.0), (VID_2, 2.0)])).retain_only(&[VID_2]);
    assert_eq!(t.get(&VID), None);
    assert_eq!(t.get(&VID_2), Some(2.0));
    assert!(!t.is_empty());
}

#[tokio::test]
async fn recv_wakes_when_the_producer_sends() {
    let (mut stream, tx) = stream_with_producer();
    let mut next = tokio_test::task::spawn(stream.recv());

    tokio_test::assert_pending!(next.poll());
    tx.try_send(Ok(tick(5.0))).unwrap();
    assert!(next.is_woken());
    let got = tokio_test::assert_ready!(next.poll());
    assert_eq!(got.unwrap().get(&VID), Some(5.0));
}
