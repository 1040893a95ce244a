mod common;
use std::collections::BTreeMap;
use std::time::Duration;

use gidata::{OnlineFunction, OnlineSubscription};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=gidata=debug shows connection handling (with the `tracing` feature).
    common::init_logging();
    let demo = common::demo()?;
    let vid = demo.variable;

    let mut ticks = demo
        .gi
        .stream_online(&[vid], OnlineSubscription::default())
        .await?;

    // In mock mode, play the server side.
    if let Some(ws) = demo.ws.clone() {
        tokio::spawn(async move {
            let Some(peer) = ws.accept().await else { return };
            for i in 0..5 {
                peer.push_json(&json!({ "Values": { vid.to_string(): f64::from(i) } }));
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            // keep the socket open until the subscription goes away
            peer.wait_closed(Duration::from_secs(5)).await;
        });
    }

    println!("streaming {vid} (5 ticks)...");
    for _ in 0..5 {
        match tokio::time::timeout(Duration::from_secs(5), ticks.recv()).await {
            Ok(Ok(update)) => println!("tick: {:?}", update.get(&vid)),
            Ok(Err(e)) => {
                eprintln!("stream ended: {e}");
                break;
            }
            Err(_) => {
                eprintln!("no tick within 5s");
                break;
            }
        }
    }

    // Writes share the same socket.
    demo.gi
        .publish_online(&BTreeMap::from([(vid, 1.0)]), OnlineFunction::Write)
        .await?;

    ticks.cancel().await;
    demo.gi.close().await;
    println!("stream stopped");

    Ok(())
}
