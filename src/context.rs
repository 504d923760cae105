use tokio_util::sync::CancellationToken;

use crate::client::{ClusterClient, KubeClusterClient};
use crate::config::OperatorConfig;
use crate::crd::Workload;
use crate::reconciler::Reconciler;

/// State shared by every reconcile pass of one controller.
pub struct Context<R, C = KubeClusterClient> {
    reconciler: Reconciler<R, C>,
    config: OperatorConfig,
    shutdown: CancellationToken,
}

impl<R, C> Context<R, C>
where
    R: Workload,
    C: ClusterClient<R>,
{
    pub fn new(reconciler: Reconciler<R, C>, config: OperatorConfig, shutdown: CancellationToken) -> Self {
        Self {
            reconciler,
            config,
            shutdown,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<R, C> {
        &self.reconciler
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Token for a single pass. Cancelled together with the operator.
    pub fn pass_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
