// src/profiler/wrapper.rs
// =============================================================================
// The profiling decorator.
//
// A component is profiled by wrapping it in `Profiled<D>`. The wrapper
// implements the same trait as the component it wraps (each trait provides
// that impl next to its definition) and routes every call through `invoke`.
// Which operations get timed is decided by a `CapabilitySet`: a constant list
// of the trait's operations with the profiled ones marked.
//
// Rust concepts:
// - Generics: Profiled<D> works for any delegate type
// - Drop: the timer records the duration however the call ends
// - std::any::type_name: the delegate's concrete type, used as its identity
// =============================================================================

use super::state::ProfilingState;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

// One operation of a capability set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub profiled: bool,
}

impl Operation {
    /// An operation whose calls are timed.
    pub const fn profiled(name: &'static str) -> Self {
        Self { name, profiled: true }
    }

    /// An operation forwarded without timing.
    pub const fn plain(name: &'static str) -> Self {
        Self { name, profiled: false }
    }
}

// The declared operations of a trait that can be wrapped
#[derive(Debug)]
pub struct CapabilitySet {
    pub name: &'static str,
    pub operations: &'static [Operation],
}

impl CapabilitySet {
    pub const fn new(name: &'static str, operations: &'static [Operation]) -> Self {
        Self { name, operations }
    }

    pub fn is_profiled(&self, operation: &str) -> bool {
        self.operations
            .iter()
            .any(|op| op.profiled && op.name == operation)
    }

    pub fn has_profiled_operations(&self) -> bool {
        self.operations.iter().any(|op| op.profiled)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    /// Wrapping only makes sense when at least one operation is timed
    #[error("capability set '{0}' has no profiled operations")]
    NoProfiledOperations(&'static str),
}

// Stand-in for a delegate that records time spent in its profiled operations
pub struct Profiled<D> {
    delegate: D,
    capabilities: &'static CapabilitySet,
    state: Arc<ProfilingState>,
    target: &'static str,
}

impl<D> Profiled<D> {
    // Wraps `delegate` so its profiled operations are timed into `state`
    //
    // Fails straight away if `capabilities` marks nothing as profiled.
    pub fn wrap(
        capabilities: &'static CapabilitySet,
        delegate: D,
        state: Arc<ProfilingState>,
    ) -> Result<Self, ProfilerError> {
        if !capabilities.has_profiled_operations() {
            return Err(ProfilerError::NoProfiledOperations(capabilities.name));
        }

        Ok(Self {
            delegate,
            capabilities,
            state,
            target: std::any::type_name::<D>(),
        })
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Concrete type name of the delegate, as it appears in the report.
    #[cfg(test)]
    pub fn target(&self) -> &'static str {
        self.target
    }

    // Forwards an async operation to the delegate
    //
    // `call` is the delegate's future for that operation. It is timed only
    // when the capability set marks `operation` as profiled; its output,
    // success or error, is returned as is.
    pub async fn invoke<F>(&self, operation: &'static str, call: F) -> F::Output
    where
        F: Future,
    {
        if !self.capabilities.is_profiled(operation) {
            return call.await;
        }

        let _timer = CallTimer::start(&self.state, self.target, operation);
        call.await
    }

    // Forwards a synchronous operation to the delegate
    pub fn invoke_sync<T>(&self, operation: &'static str, call: impl FnOnce(&D) -> T) -> T {
        if !self.capabilities.is_profiled(operation) {
            return call(&self.delegate);
        }

        let _timer = CallTimer::start(&self.state, self.target, operation);
        call(&self.delegate)
    }
}

// Records the elapsed time when dropped, so errors and panics are counted too
struct CallTimer<'a> {
    state: &'a ProfilingState,
    target: &'static str,
    operation: &'static str,
    started: Instant,
}

impl<'a> CallTimer<'a> {
    fn start(state: &'a ProfilingState, target: &'static str, operation: &'static str) -> Self {
        Self {
            state,
            target,
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for CallTimer<'_> {
    fn drop(&mut self) {
        self.state
            .record(self.target, self.operation, self.started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    // A small capability with one timed and one untimed operation
    #[async_trait]
    trait Greeter: Send + Sync {
        async fn greet(&self, name: &str) -> Result<String, String>;
        fn language(&self) -> &'static str;
    }

    const GREETER: CapabilitySet = CapabilitySet::new(
        "Greeter",
        &[Operation::profiled("greet"), Operation::plain("language")],
    );

    const UNPROFILED_GREETER: CapabilitySet =
        CapabilitySet::new("Greeter", &[Operation::plain("greet"), Operation::plain("language")]);

    #[async_trait]
    impl<D: Greeter> Greeter for Profiled<D> {
        async fn greet(&self, name: &str) -> Result<String, String> {
            self.invoke("greet", self.delegate().greet(name)).await
        }

        fn language(&self) -> &'static str {
            self.invoke_sync("language", |greeter| greeter.language())
        }
    }

    struct SlowGreeter {
        delay: Duration,
    }

    #[async_trait]
    impl Greeter for SlowGreeter {
        async fn greet(&self, name: &str) -> Result<String, String> {
            tokio::time::sleep(self.delay).await;
            Ok(format!("hello, {}", name))
        }

        fn language(&self) -> &'static str {
            "en"
        }
    }

    struct FailingGreeter;

    #[async_trait]
    impl Greeter for FailingGreeter {
        async fn greet(&self, name: &str) -> Result<String, String> {
            Err(format!("no greeting for {}", name))
        }

        fn language(&self) -> &'static str {
            "none"
        }
    }

    fn slow(delay_ms: u64) -> SlowGreeter {
        SlowGreeter {
            delay: Duration::from_millis(delay_ms),
        }
    }

    #[test]
    fn test_wrap_without_profiled_operations_fails() {
        let state = Arc::new(ProfilingState::new());
        let result = Profiled::wrap(&UNPROFILED_GREETER, slow(0), state);
        assert!(matches!(
            result,
            Err(ProfilerError::NoProfiledOperations("Greeter"))
        ));
    }

    #[test]
    fn test_target_is_delegate_type() {
        let state = Arc::new(ProfilingState::new());
        let greeter = Profiled::wrap(&GREETER, slow(0), state).unwrap();
        assert!(greeter.target().ends_with("SlowGreeter"));
    }

    #[test]
    fn test_plain_operation_does_not_touch_state() {
        let state = Arc::new(ProfilingState::new());
        let greeter = Profiled::wrap(&GREETER, slow(0), Arc::clone(&state)).unwrap();

        assert_eq!(greeter.language(), "en");
        assert_eq!(greeter.language(), "en");
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_profiled_calls_accumulate() {
        let state = Arc::new(ProfilingState::new());
        let greeter = Profiled::wrap(&GREETER, slow(20), Arc::clone(&state)).unwrap();

        assert_eq!(greeter.greet("ferris").await.unwrap(), "hello, ferris");
        assert_eq!(greeter.greet("corro").await.unwrap(), "hello, corro");

        let entry = state.get(greeter.target(), "greet").unwrap();
        assert_eq!(entry.invocations, 2);
        assert!(entry.total >= Duration::from_millis(40));
        assert!(entry.total < Duration::from_millis(40) + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_delegate_error_is_returned_and_still_timed() {
        let state = Arc::new(ProfilingState::new());
        let greeter = Profiled::wrap(&GREETER, FailingGreeter, Arc::clone(&state)).unwrap();

        let err = greeter.greet("ferris").await.unwrap_err();
        assert_eq!(err, "no greeting for ferris");

        let entry = state.get(greeter.target(), "greet").unwrap();
        assert_eq!(entry.invocations, 1);
    }
}
