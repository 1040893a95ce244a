mod common;
use gidata::TimeWindow;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let demo = common::demo()?;

    // Archive data always comes from the REST history surface.
    let frame = demo
        .gi
        .fetch_history(&[demo.selector()], TimeWindow::last(60_000.0), 60)
        .await?;

    let (rows, cols) = frame.shape();
    println!("{rows} rows x {cols} columns");
    if let Some(first) = frame.index().first() {
        println!("first sample at {first}");
    }

    Ok(())
}
