use lapse::*;
use simple_logger::SimpleLogger;

use std::time::Duration;

#[tokio::main]
async fn main() {
    // enable logs for example purposes
    SimpleLogger::new().init().unwrap();

    // create our new cache, sweeping every 100ms
    let cache = Cache::with_frequency(Duration::from_millis(100));

    // insert 100K entries expiring over the next few seconds
    for i in 0..100000 {
        cache.insert(i, i, Duration::from_millis(i / 20 + 1)).await;
    }

    // watch the sweeper drain the cache
    while !cache.is_empty().await {
        println!("{} entries remaining", cache.len().await);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    // stop the sweeper before exiting
    cache.shutdown();
}
