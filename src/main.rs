//! Microservice operator binary.

use clap::{Parser, ValueEnum};
use futures::future::BoxFuture;
use futures::FutureExt;
use kube::{Client, CustomResourceExt};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use microservice_operator::{
    AuthenticationService, CoreUi, Microservice, Operator, OperatorConfig, Workload,
};

/// Reconciles Microservice, CoreUI and AuthenticationService resources into
/// Deployments, Services and Ingresses.
#[derive(Parser, Debug)]
#[command(name = "microservice-operator", version, about, long_about = None)]
struct Cli {
    /// Print CRD manifests and exit
    #[arg(long)]
    crd: bool,

    /// Kinds to run controllers for (default: all)
    #[arg(long = "kind", value_enum)]
    kinds: Vec<Kind>,

    /// Only watch this namespace
    #[arg(long, env = "OPERATOR_NAMESPACE")]
    namespace: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Microservice,
    Coreui,
    Authenticationservice,
}

impl Kind {
    const ALL: [Kind; 3] = [Kind::Microservice, Kind::Coreui, Kind::Authenticationservice];
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.crd {
        print_crds()?;
        return Ok(());
    }

    let mut config = OperatorConfig::from_env()?;
    if let Some(ns) = cli.namespace {
        config = config.namespace(ns);
    }

    let client = Client::try_default().await?;
    tracing::info!("Connected to Kubernetes cluster");

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let kinds = if cli.kinds.is_empty() {
        Kind::ALL.to_vec()
    } else {
        cli.kinds
    };

    let controllers: Vec<BoxFuture<'static, microservice_operator::Result<()>>> = kinds
        .into_iter()
        .map(|kind| match kind {
            Kind::Microservice => controller::<Microservice>(&client, &config, &shutdown),
            Kind::Coreui => controller::<CoreUi>(&client, &config, &shutdown),
            Kind::Authenticationservice => {
                controller::<AuthenticationService>(&client, &config, &shutdown)
            }
        })
        .collect();

    futures::future::try_join_all(controllers).await?;
    tracing::info!("All controllers stopped");
    Ok(())
}

fn controller<R: Workload>(
    client: &Client,
    config: &OperatorConfig,
    shutdown: &CancellationToken,
) -> BoxFuture<'static, microservice_operator::Result<()>> {
    Operator::<R>::new(config.clone())
        .shutdown_token(shutdown.clone())
        .run(client.clone())
        .boxed()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("microservice_operator=info,kube=info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn print_crds() -> anyhow::Result<()> {
    let crds = [
        Microservice::crd(),
        CoreUi::crd(),
        AuthenticationService::crd(),
    ];
    for crd in crds {
        println!("---");
        print!("{}", serde_yaml::to_string(&crd)?);
    }
    Ok(())
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received, cancelling in-flight passes");
    shutdown.cancel();
}
