use crate::child::ChildKind;
use crate::client::{ClusterClient, KubeClusterClient, ObjectKey};
use crate::config::OperatorConfig;
use crate::context::Context;
use crate::crd::Workload;
use crate::error::{Error, Result};
use crate::reconciler::Reconciler;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::Api;
use kube::core::NamespaceResourceScope;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher::Config as WatcherConfig;
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Which objects trigger a pass: the parent kind itself, and any owned child
/// whose controller reference points back at a parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchRegistration {
    pub parent: String,
    pub owned: Vec<ChildKind>,
}

pub struct Operator<R>
where
    R: Workload,
{
    config: OperatorConfig,
    shutdown: CancellationToken,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Operator<R>
where
    R: Workload,
{
    pub fn new(config: OperatorConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            _marker: PhantomData,
        }
    }

    /// Share a shutdown token with the caller. Cancelling it aborts passes in flight.
    pub fn shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn watches() -> WatchRegistration {
        WatchRegistration {
            parent: R::kind(&()).to_string(),
            owned: ChildKind::ALL.to_vec(),
        }
    }

    pub async fn run(self, client: Client) -> Result<()> {
        let watches = Self::watches();
        info!(
            parent = %watches.parent,
            owned = ?watches.owned,
            namespace = self.config.namespace.as_deref().unwrap_or("*"),
            "Starting controller for {}/{}",
            R::group(&()),
            R::kind(&())
        );

        let cluster = Arc::new(KubeClusterClient::new(
            client.clone(),
            self.config.field_manager.clone(),
            self.config.reporting_instance.clone(),
        ));
        let reconciler = Reconciler::from_config(cluster, &self.config);
        let namespace = self.config.namespace.clone();
        let ctx = Arc::new(Context::new(reconciler, self.config, self.shutdown));

        let parents: Api<R> = scoped_api(&client, namespace.as_deref());

        Controller::new(parents, WatcherConfig::default())
            .owns(
                scoped_api::<Deployment>(&client, namespace.as_deref()),
                WatcherConfig::default(),
            )
            .owns(
                scoped_api::<Service>(&client, namespace.as_deref()),
                WatcherConfig::default(),
            )
            .owns(
                scoped_api::<Ingress>(&client, namespace.as_deref()),
                WatcherConfig::default(),
            )
            .shutdown_on_signal()
            .run(
                reconcile::<R, KubeClusterClient>,
                error_policy::<R, KubeClusterClient>,
                ctx,
            )
            .for_each(|result| async move {
                match result {
                    Ok((resource, action)) => {
                        debug!("Reconciled {} - {:?}", resource.name, action);
                    }
                    Err(e) => {
                        warn!("Reconciliation error: {:?}", e);
                    }
                }
            })
            .await;

        info!("Controller for {} stopped", R::kind(&()));
        Ok(())
    }
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + DeserializeOwned,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Controller entry point: one pass for the object the watch delivered.
pub async fn reconcile<R, C>(resource: Arc<R>, ctx: Arc<Context<R, C>>) -> Result<Action>
where
    R: Workload,
    C: ClusterClient<R> + 'static,
{
    let key = ObjectKey::of(resource.as_ref());
    let outcome = ctx
        .reconciler()
        .reconcile_with(&key, &ctx.pass_token())
        .await?;

    info!(kind = %R::kind(&()), key = %key, outcome = ?outcome, "reconcile pass finished");
    Ok(outcome.action())
}

pub fn error_policy<R, C>(resource: Arc<R>, error: &Error, ctx: Arc<Context<R, C>>) -> Action
where
    R: Workload,
    C: ClusterClient<R> + 'static,
{
    let name = resource.name_any();
    error!(kind = %R::kind(&()), name = %name, "Error reconciling {}: {}", name, error);

    if ctx.is_shutting_down() {
        Action::await_change()
    } else if error.is_retryable() {
        Action::requeue(ctx.config().error_requeue)
    } else {
        Action::await_change()
    }
}
