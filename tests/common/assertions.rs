// Custom test assertions for integration tests

use std::future::Future;
use std::time::Duration;

/// Await `fut`, failing the test if it does not finish within `timeout`.
pub async fn resolve_within<F: Future>(fut: F, timeout: Duration) -> F::Output {
    match tokio::time::timeout(timeout, fut).await {
        Ok(output) => output,
        Err(_) => panic!("Future did not resolve within {:?}", timeout),
    }
}

/// Assert that a condition becomes true within a timeout
#[macro_export]
macro_rules! assert_eventually {
    ($cond:expr, $timeout_ms:expr) => {
        assert_eventually!(@ $cond, $timeout_ms, 10)
    };
    (@ $cond:expr, $timeout_ms:expr, $interval_ms:expr) => {{
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis($timeout_ms);
        let interval = std::time::Duration::from_millis($interval_ms);

        while start.elapsed() < timeout {
            if $cond {
                break;
            }
            tokio::time::sleep(interval).await;
        }

        assert!(
            $cond,
            "Condition did not become true within {:?}",
            timeout
        );
    }};
}

/// Assert that a creation result failed with the given error pattern
#[macro_export]
macro_rules! assert_create_err {
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Err(other) => panic!("Expected {}, got error: {}", stringify!($pattern), other),
            Ok(handle) => panic!(
                "Expected {}, got ledger {}",
                stringify!($pattern),
                handle.id()
            ),
        }
    };
}
