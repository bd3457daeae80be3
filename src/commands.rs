// One function per CLI verb. Each resolves its configuration, builds a client
// with the editors that verb needs, performs the call(s) and hands back the
// decoded result. Only `init`, `login` and `register` ever write the config,
// and only after the step they depend on has succeeded.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::api::{
    AdminLoginRequest, AdminLoginResponse, AdminRecoverRequest, BoxeeApi, Device,
    DeviceAddRequest, DeviceKey, DeviceKeyGenRequest, DeviceList, DevicePatchRequest,
    TrackingList, TrackingRequestItem,
};
use crate::batch::{self, BatchResult};
use crate::client::{parse_address, ClientBuilder, Transport};
use crate::config::{ConfigKey, ConfigStore, StoredConfig};
use crate::decode::{Decoded, StandardResponse};
use crate::error::{require, Error, Result};
use crate::middleware::Middleware;
use crate::resolve::{resolve, EffectiveConfig, Environment, Overrides};

/// Result of a `tracking file` run, one entry per input line.
pub type TrackingBatch = Vec<BatchResult<TrackingRequestItem, StandardResponse>>;

/// Everything one command invocation works with.
pub struct Invocation {
    store: ConfigStore,
    env: Environment,
    overrides: Overrides,
    transport: Option<Arc<dyn Transport>>,
}

impl Invocation {
    pub fn new(store: ConfigStore, env: Environment, overrides: Overrides) -> Self {
        Invocation {
            store,
            env,
            overrides,
            transport: None,
        }
    }

    /// Route every request through `transport` instead of the network.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Load the persisted config, failing if it does not exist.
    fn load_required(&mut self) -> Result<()> {
        if !self.store.is_loaded() {
            self.store.load()?;
        }
        Ok(())
    }

    /// Load the persisted config if there is one.
    fn load_optional(&mut self) -> Result<()> {
        if self.store.is_loaded() {
            return Ok(());
        }
        match self.store.load() {
            Ok(_) => Ok(()),
            Err(Error::ConfigNotFound { path }) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn effective(&self) -> EffectiveConfig {
        let persisted = self.store.is_loaded().then(|| self.store.values());
        resolve(&self.overrides, persisted, &self.env)
    }

    fn api(&self, cfg: &EffectiveConfig, middleware: Middleware) -> Result<BoxeeApi> {
        let mut builder = ClientBuilder::new(&cfg.address)
            .timeout(cfg.timeout)
            .attach(middleware);
        if let Some(transport) = &self.transport {
            builder = builder.transport(transport.clone());
        }
        Ok(BoxeeApi::new(builder.build()?))
    }

    /// Client for the login/registration endpoints: content type only.
    fn anonymous(&self, cfg: &EffectiveConfig) -> Result<BoxeeApi> {
        self.api(cfg, Middleware::content_type())
    }

    /// Client carrying the session token. An empty token is not rejected
    /// here; the first request fails before it is sent.
    fn authenticated(&mut self) -> Result<BoxeeApi> {
        self.load_required()?;
        let cfg = self.effective();
        if !cfg.is_authenticated() {
            debug!("no session token configured, run `boxee login` first");
        }
        self.api(&cfg, Middleware::auth_header(cfg.session_token.clone()))
    }

    /// Create or refresh the config with `email` and the resolved address.
    /// An existing session token is kept. The address is validated before
    /// anything lands on disk.
    pub fn init(&mut self, email: &str) -> Result<StoredConfig> {
        require("email", email)?;
        self.load_optional()?;

        let address = self.effective().address;
        parse_address(&address)?;

        self.store.set(ConfigKey::Email, email);
        self.store.set(ConfigKey::Address, address);
        self.store.write()?;
        Ok(self.store.values().clone())
    }

    /// Log in and persist the returned session token. The config is written
    /// once, and only for a successful response carrying a token.
    pub fn login(&mut self, password: &str) -> Result<Decoded<AdminLoginResponse>> {
        self.load_optional()?;
        let cfg = self.effective();
        require("email", &cfg.email)?;
        require("password", password)?;

        let api = self.anonymous(&cfg)?;
        let decoded = api.admin_login(&AdminLoginRequest {
            email: cfg.email.clone(),
            password: password.to_owned(),
        })?;

        if let Decoded::Success(resp) = &decoded {
            if resp.session_token.trim().is_empty() {
                debug!("login succeeded without a session token, config left unchanged");
            } else {
                self.store
                    .set(ConfigKey::SessionToken, resp.session_token.clone());
                self.store.write()?;
            }
        }
        Ok(decoded)
    }

    /// Register `email`. On success the email is persisted as the account
    /// email if it differs from the stored one.
    pub fn register(&mut self, email: &str, password: &str) -> Result<Decoded<serde_json::Value>> {
        require("email", email)?;
        require("password", password)?;
        self.load_required()?;
        let cfg = self.effective();

        let api = self.anonymous(&cfg)?;
        let decoded = api.admin_register(&AdminLoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        })?;

        if decoded.is_success() && self.store.get(ConfigKey::Email) != email {
            self.store.set(ConfigKey::Email, email);
            self.store.write()?;
        }
        Ok(decoded)
    }

    pub fn recover(&mut self, email: &str) -> Result<Decoded<serde_json::Value>> {
        require("email", email)?;
        self.load_required()?;
        let cfg = self.effective();
        self.anonymous(&cfg)?.admin_recover(&AdminRecoverRequest {
            email: email.to_owned(),
        })
    }

    pub fn device_add(&mut self, name: &str, kind: &str) -> Result<Decoded<Device>> {
        require("device name", name)?;
        require("device type", kind)?;
        self.authenticated()?.add_device(&DeviceAddRequest {
            device_name: name.to_owned(),
            device_type: kind.to_owned(),
        })
    }

    pub fn device_update(&mut self, device_id: &str, to_name: &str) -> Result<Decoded<Device>> {
        require("device id", device_id)?;
        require("device name", to_name)?;
        self.authenticated()?.update_device(&DevicePatchRequest {
            device_id: device_id.to_owned(),
            to_name: to_name.to_owned(),
        })
    }

    pub fn device_delete(&mut self, device_id: &str) -> Result<Decoded<StandardResponse>> {
        require("device id", device_id)?;
        self.authenticated()?.delete_device(device_id)
    }

    pub fn device_list(&mut self) -> Result<Decoded<DeviceList>> {
        self.authenticated()?.list_devices()
    }

    pub fn device_generate_key(&mut self, device_id: &str) -> Result<Decoded<DeviceKey>> {
        require("device id", device_id)?;
        self.authenticated()?.generate_key(&DeviceKeyGenRequest {
            device_id: device_id.to_owned(),
        })
    }

    pub fn tracking_add(
        &mut self,
        tracking_number: &str,
        device_id: Option<&str>,
    ) -> Result<Decoded<StandardResponse>> {
        require("tracking number", tracking_number)?;
        self.authenticated()?
            .add_tracking(&tracking_item(tracking_number, device_id))
    }

    pub fn tracking_delete(&mut self, tracking_id: &str) -> Result<Decoded<StandardResponse>> {
        require("tracking id", tracking_id)?;
        self.authenticated()?.delete_tracking(tracking_id)
    }

    pub fn tracking_list(&mut self, device_id: Option<&str>) -> Result<Decoded<TrackingList>> {
        self.authenticated()?.list_trackings(device_id)
    }

    /// Add every tracking number listed in `path`. Reading the file and
    /// building the client happen before the first request; after that each
    /// line gets exactly one request and one result, whatever happens to the
    /// others.
    pub fn tracking_file(
        &mut self,
        path: &Path,
        device_id: Option<&str>,
        observe: impl FnMut(usize, usize),
    ) -> Result<TrackingBatch> {
        let items: Vec<TrackingRequestItem> = batch::read_lines(path)?
            .iter()
            .map(|number| tracking_item(number, device_id))
            .collect();
        let api = self.authenticated()?;
        debug!(items = items.len(), path = %path.display(), "starting tracking batch");
        Ok(batch::run_observed(
            items,
            |item| api.add_tracking(item),
            observe,
        ))
    }
}

fn tracking_item(tracking_number: &str, device_id: Option<&str>) -> TrackingRequestItem {
    TrackingRequestItem {
        tracking_number: tracking_number.to_owned(),
        device_id: device_id.filter(|id| !id.is_empty()).map(str::to_owned),
    }
}
