mod common;
use gidata::TimeWindow;
use gidata::sync::BlockingGiData;

// No async runtime here: the blocking client owns one.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let demo = common::demo()?;
    let sel = demo.selector();
    let gi = BlockingGiData::new(demo.gi)?;

    let frame = gi.fetch_buffer(&[sel], TimeWindow::last(10_000.0), 512)?;
    println!("blocking fetch: {:?}", frame.shape());

    gi.close();
    Ok(())
}
