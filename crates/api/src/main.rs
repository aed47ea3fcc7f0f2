use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use iamflow_api::app::{build_app, build_services};
use iamflow_auth::{AuthenticationType, Principal, PrincipalStatus, ROOT_ROLE, Role, hash_password};
use iamflow_core::{PrincipalId, RoleId};
use iamflow_infra::store::InMemoryCredentialStore;
use iamflow_infra::{AppConfig, BootstrapRoot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    iamflow_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "configuration loaded");

    let credentials = Arc::new(InMemoryCredentialStore::new());
    if let Some(root) = &config.bootstrap_root {
        seed_root(&credentials, root)?;
    }

    let services = build_services(&config, credentials).context("failed to start mail workers")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn seed_root(store: &InMemoryCredentialStore, root: &BootstrapRoot) -> anyhow::Result<()> {
    let password_hash = hash_password(&root.password)?;
    store.insert(Principal {
        id: PrincipalId::new(1),
        tenant_id: Some(root.tenant_id),
        email: root.email.clone(),
        password_hash: Some(password_hash),
        roles: vec![Role::new(RoleId::new(1), ROOT_ROLE, Some(root.tenant_id))],
        is_root: true,
        auth_type: AuthenticationType::Password,
        status: PrincipalStatus::Active,
        last_login_at: None,
    })?;
    tracing::info!(tenant_id = %root.tenant_id, "bootstrap root principal created");
    Ok(())
}
