mod common;
use gidata::TimeWindow;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the client (mock in CI when GIDATA_EXAMPLES_USE_MOCK is set).
    let demo = common::demo()?;

    // 2. The environment decides between the REST and GraphQL buffer drivers.
    println!("environment: {:?}", demo.gi.environment());
    for source in demo.gi.list_buffer_sources().await? {
        println!("source {} ({})", source.name, source.id);
    }

    // 3. Fetch the last ten seconds, downsampled to at most 2048 points.
    let frame = demo
        .gi
        .fetch_buffer(&[demo.selector()], TimeWindow::last(10_000.0), 2048)
        .await?;
    println!("shape: {:?}", frame.shape());
    println!("columns: {:?}", frame.column_names());

    Ok(())
}
