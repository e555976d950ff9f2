use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("flex-dividends"));

// --- Flex Web Service ---

pub static FLEX_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("flex.request.duration")
        .with_description("Duration of a single Flex Web Service round trip in seconds")
        .with_unit("s")
        .build()
});

pub static FLEX_POLL_ATTEMPTS: LazyLock<Histogram<u64>> = LazyLock::new(|| {
    METER
        .u64_histogram("flex.poll.attempts")
        .with_description("GetStatement requests issued per poll loop")
        .with_unit("{request}")
        .with_boundaries(vec![1.0, 2.0, 3.0, 5.0, 10.0, 20.0, 30.0])
        .build()
});

pub static FLEX_QUERY_ERRORS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("flex.query.errors")
        .with_description("Failed Flex queries by error type")
        .with_unit("{error}")
        .build()
});

// --- Domain Metrics ---

pub static DIVIDENDS_FOUND: LazyLock<Histogram<u64>> = LazyLock::new(|| {
    METER
        .u64_histogram("dividends.found")
        .with_description("Dividend records per run")
        .with_unit("{dividend}")
        .build()
});

pub static EXAMPLE_DATA_FALLBACKS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("dividends.example_fallback")
        .with_description("Runs that used the built-in example statement")
        .with_unit("{run}")
        .build()
});

pub static NOTIFICATIONS_SENT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("notifications.sent")
        .with_description("Dividend reports handed to a notifier")
        .with_unit("{notification}")
        .build()
});
