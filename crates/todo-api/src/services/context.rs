//! 요청 단위 실행 컨텍스트.
//!
//! 요청 기한과 취소 신호를 모든 협력자 호출에 전파합니다.
//! 기한이 지나거나 취소되면 진행 중인 협력자 future를 drop하고
//! [`AuthError::DeadlineExceeded`]를 반환합니다. 재시도는 하지 않습니다.

use std::future::Future;
use std::time::Duration;
use todo_core::{AuthError, AuthResult};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestContext {
    /// 기한 없는 컨텍스트.
    pub fn background() -> Self {
        Self::default()
    }

    /// 현재 시각 + `timeout`을 기한으로 하는 컨텍스트.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// 외부 취소 토큰을 연결합니다 (예: 서버 종료 토큰의 child).
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 기한 초과 또는 취소 여부.
    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// 기한과 취소 신호에 맞춰 `fut`를 실행합니다.
    pub async fn run<F>(&self, fut: F) -> AuthResult<F::Output>
    where
        F: Future,
    {
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AuthError::DeadlineExceeded),
            _ = expired => Err(AuthError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_before_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let result = ctx.run(async { 42 }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline_exceeded() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(100));
        let slow = tokio::time::sleep(Duration::from_secs(10));

        assert_eq!(ctx.run(slow).await, Err(AuthError::DeadlineExceeded));
        assert!(ctx.is_done());
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let ctx = RequestContext::background();
        ctx.cancel();

        let result = ctx.run(async { "never" }).await;
        assert_eq!(result, Err(AuthError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_parent_cancellation_propagates() {
        let shutdown = CancellationToken::new();
        let ctx = RequestContext::background().with_cancel(shutdown.child_token());
        assert!(!ctx.is_done());

        shutdown.cancel();
        assert!(ctx.is_done());
        assert_eq!(
            ctx.run(std::future::pending::<()>()).await,
            Err(AuthError::DeadlineExceeded)
        );
    }

    #[tokio::test]
    async fn test_background_has_no_deadline() {
        let ctx = RequestContext::background();
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_done());
    }
}
