//! Reconciliation engine shared by every workload kind.
//!
//! A pass re-reads the parent, then walks the child kinds in order
//! (Deployment, Service, Ingress). The first missing child is created and the
//! pass ends there; the watch on owned objects triggers the next pass. Existing
//! children are left as they are, even when they differ from what the builder
//! would produce.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::builder::{build_child, BuildOptions};
use crate::child::{ChildKind, ChildObject};
use crate::client::{object_reference, ClusterClient, EventKind, ObjectKey};
use crate::config::OperatorConfig;
use crate::crd::Workload;
use crate::error::{Error, Result};
use crate::owner::{is_controlled_by, set_owner};
use crate::status::{Condition, WorkloadStatus};

/// How a successful pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The parent no longer exists; owned children are left to garbage collection.
    ParentGone,
    /// One child was created and the pass stopped.
    Created(ChildKind),
    /// Every child already exists.
    Converged,
}

impl Outcome {
    /// Passes never poll: creations and parent edits come back as watch events.
    pub fn action(&self) -> Action {
        Action::await_change()
    }
}

pub struct Reconciler<R, C> {
    client: Arc<C>,
    options: BuildOptions,
    timeout: Option<Duration>,
    _marker: PhantomData<fn() -> R>,
}

impl<R, C> Clone for Reconciler<R, C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            options: self.options.clone(),
            timeout: self.timeout,
            _marker: PhantomData,
        }
    }
}

impl<R, C> Reconciler<R, C>
where
    R: Workload,
    C: ClusterClient<R>,
{
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            options: BuildOptions::default(),
            timeout: None,
            _marker: PhantomData,
        }
    }

    pub fn from_config(client: Arc<C>, config: &OperatorConfig) -> Self {
        Self::new(client)
            .build_options(BuildOptions {
                ingress_class: config.ingress_class.clone(),
            })
            .timeout(config.reconcile_timeout)
    }

    pub fn build_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one pass, giving up when `cancel` fires or the configured deadline
    /// passes. Dropping the pass future abandons whatever request is in flight.
    pub async fn reconcile_with(&self, key: &ObjectKey, cancel: &CancellationToken) -> Result<Outcome> {
        let pass = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, self.reconcile(key))
                    .await
                    .map_err(|_| Error::DeadlineExceeded(limit))?,
                None => self.reconcile(key).await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(key = %key, "reconcile pass cancelled");
                Err(Error::Cancelled)
            }
            result = pass => result,
        }
    }

    #[instrument(skip(self, key), fields(kind = %R::kind(&()), key = %key))]
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Outcome> {
        let Some(parent) = self.client.get_parent(key).await? else {
            info!("resource not found, assuming it was deleted");
            return Ok(Outcome::ParentGone);
        };

        match self.converge(&parent, key).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.report_failure(&parent, key, &err).await;
                Err(err)
            }
        }
    }

    async fn converge(&self, parent: &R, key: &ObjectKey) -> Result<Outcome> {
        let uid = parent.uid().unwrap_or_default();
        let mut present = Vec::with_capacity(ChildKind::ALL.len());

        for kind in ChildKind::ALL {
            let mut desired = build_child(kind, parent, &self.options);
            set_owner(parent, &mut desired)?;
            let child_key = ObjectKey::new(desired.namespace(), desired.name());

            if let Some(live) = self.client.get_child(kind, &child_key).await? {
                if !is_controlled_by(&live, &uid) {
                    warn!(child = %kind, "existing {} {} is not controlled by this resource", kind, child_key);
                }
                present.push(kind);
                continue;
            }

            match self.create(key, &desired).await? {
                CreateResult::Created => {
                    present.push(kind);
                    self.announce(parent, &desired).await;
                    self.write_status(parent, key, progressing_status(parent, kind, &present))
                        .await?;
                    return Ok(Outcome::Created(kind));
                }
                CreateResult::AlreadyExists => present.push(kind),
                CreateResult::ParentGone => return Ok(Outcome::ParentGone),
            }
        }

        self.write_status(parent, key, converged_status(parent, &present))
            .await?;
        Ok(Outcome::Converged)
    }

    async fn create(&self, key: &ObjectKey, desired: &ChildObject) -> Result<CreateResult> {
        let kind = desired.kind();
        info!(child = %kind, namespace = desired.namespace(), name = desired.name(), "creating {}", kind);

        match self.client.create_child(desired).await {
            Ok(()) => Ok(CreateResult::Created),
            Err(e) if e.is_already_exists() => {
                debug!(child = %kind, "{} created concurrently", kind);
                Ok(CreateResult::AlreadyExists)
            }
            Err(e) if e.is_not_found() => self.parent_gone_or(e, kind, key).await,
            Err(e) => Err(e),
        }
    }

    /// A 404 on create only ends the pass when the parent itself is gone.
    /// Otherwise the create error is returned as it was.
    async fn parent_gone_or(&self, err: Error, kind: ChildKind, key: &ObjectKey) -> Result<CreateResult> {
        match self.client.get_parent(key).await {
            Ok(None) => {
                info!(child = %kind, "resource deleted while creating {}", kind);
                Ok(CreateResult::ParentGone)
            }
            Ok(Some(_)) => Err(err),
            Err(refetch) => {
                warn!(error = %refetch, "cannot re-read resource after failed create");
                Err(err)
            }
        }
    }

    async fn announce(&self, parent: &R, child: &ChildObject) {
        let message = format!("Created {} {}/{}", child.kind(), child.namespace(), child.name());
        if let Err(e) = self
            .client
            .publish_event(&object_reference(parent), EventKind::Normal, "Created", &message)
            .await
        {
            warn!(error = %e, "failed to publish event");
        }
    }

    async fn write_status(&self, parent: &R, key: &ObjectKey, status: WorkloadStatus) -> Result<()> {
        let previous = parent.workload_status();
        let status = status.carry_transition_times(previous);
        if previous == Some(&status) {
            debug!("status unchanged");
            return Ok(());
        }

        match self.client.patch_status(key, &status).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                info!("resource deleted before its status could be written");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn report_failure(&self, parent: &R, key: &ObjectKey, err: &Error) {
        if matches!(err, Error::Cancelled | Error::DeadlineExceeded(_)) {
            return;
        }
        let status = failed_status(parent, err);
        if let Err(e) = self.write_status(parent, key, status).await {
            warn!(error = %e, "failed to record reconcile failure in status");
        }

        let message = err.to_string();
        if let Err(e) = self
            .client
            .publish_event(&object_reference(parent), EventKind::Warning, "ReconcileFailed", &message)
            .await
        {
            warn!(error = %e, "failed to publish event");
        }
    }
}

enum CreateResult {
    Created,
    AlreadyExists,
    ParentGone,
}

fn children(present: &[ChildKind]) -> Vec<String> {
    present.iter().map(|k| k.as_str().to_string()).collect()
}

fn progressing_status<R: Resource>(parent: &R, created: ChildKind, present: &[ChildKind]) -> WorkloadStatus {
    WorkloadStatus {
        conditions: vec![
            Condition::ready(false).reason("ChildrenPending"),
            Condition::progressing(true)
                .reason(format!("Created{created}"))
                .message(format!("Created {created}")),
            Condition::failed(false),
        ],
        observed_generation: parent.meta().generation,
        children: children(present),
    }
}

fn converged_status<R: Resource>(parent: &R, present: &[ChildKind]) -> WorkloadStatus {
    WorkloadStatus {
        conditions: vec![
            Condition::ready(true),
            Condition::progressing(false),
            Condition::failed(false),
        ],
        observed_generation: parent.meta().generation,
        children: children(present),
    }
}

fn failed_status<R: Workload>(parent: &R, err: &Error) -> WorkloadStatus {
    let previous = parent.workload_status().cloned().unwrap_or_default();
    let mut conditions: Vec<Condition> = previous
        .conditions
        .into_iter()
        .filter(|c| c.type_ != crate::status::FAILED)
        .collect();
    conditions.push(Condition::failed(true).message(err.to_string()));

    WorkloadStatus {
        conditions,
        observed_generation: previous.observed_generation,
        children: previous.children,
    }
}
