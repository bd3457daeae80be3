// Typed endpoints of the Box-ee service. Each method is one request through
// an `AuthenticatedClient`; which headers go out is decided by the editors the
// client was built with, not here.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::AuthenticatedClient;
use crate::decode::{Decoded, StandardResponse};
use crate::error::{require, Result};

const LOGIN: &str = "/admin/login";
const REGISTER: &str = "/admin/register";
const RECOVER: &str = "/admin/recover";
const DEVICE: &str = "/device";
const DEVICE_KEYGEN: &str = "/device/keygen";
const TRACKING: &str = "/tracking";

/// Credentials for login and registration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminRecoverRequest {
    pub email: String,
}

/// Body of a successful login. The token is opaque to the client.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminLoginResponse {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub session_token: String,
    #[serde(default)]
    pub status_code: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeviceAddRequest {
    pub device_name: String,
    pub device_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DevicePatchRequest {
    pub device_id: String,
    pub to_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeviceKeyGenRequest {
    pub device_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Client key issued for a device.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceKey {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub client_key: String,
}

/// One tracking number to register, optionally bound to a device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackingRequestItem {
    pub tracking_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracking {
    #[serde(default)]
    pub tracking_id: String,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingList {
    #[serde(default)]
    pub trackings: Vec<Tracking>,
}

/// The Box-ee endpoints, bound to one client.
#[derive(Debug)]
pub struct BoxeeApi {
    client: AuthenticatedClient,
}

impl BoxeeApi {
    pub fn new(client: AuthenticatedClient) -> Self {
        BoxeeApi { client }
    }

    pub fn admin_login(&self, req: &AdminLoginRequest) -> Result<Decoded<AdminLoginResponse>> {
        require("email", &req.email)?;
        require("password", &req.password)?;
        self.client.call(Method::POST, LOGIN, &[], Some(req))
    }

    pub fn admin_register(&self, req: &AdminLoginRequest) -> Result<Decoded<serde_json::Value>> {
        require("email", &req.email)?;
        require("password", &req.password)?;
        self.client.call(Method::POST, REGISTER, &[], Some(req))
    }

    pub fn admin_recover(&self, req: &AdminRecoverRequest) -> Result<Decoded<serde_json::Value>> {
        require("email", &req.email)?;
        self.client.call(Method::POST, RECOVER, &[], Some(req))
    }

    pub fn add_device(&self, req: &DeviceAddRequest) -> Result<Decoded<Device>> {
        require("device name", &req.device_name)?;
        require("device type", &req.device_type)?;
        self.client.call(Method::POST, DEVICE, &[], Some(req))
    }

    pub fn update_device(&self, req: &DevicePatchRequest) -> Result<Decoded<Device>> {
        require("device id", &req.device_id)?;
        require("device name", &req.to_name)?;
        self.client.call(Method::PATCH, DEVICE, &[], Some(req))
    }

    pub fn delete_device(&self, device_id: &str) -> Result<Decoded<StandardResponse>> {
        require("device id", device_id)?;
        self.client
            .call::<_, ()>(Method::DELETE, DEVICE, &[("device_id", device_id)], None)
    }

    pub fn list_devices(&self) -> Result<Decoded<DeviceList>> {
        self.client.call::<_, ()>(Method::GET, DEVICE, &[], None)
    }

    pub fn generate_key(&self, req: &DeviceKeyGenRequest) -> Result<Decoded<DeviceKey>> {
        require("device id", &req.device_id)?;
        self.client.call(Method::POST, DEVICE_KEYGEN, &[], Some(req))
    }

    pub fn add_tracking(&self, req: &TrackingRequestItem) -> Result<Decoded<StandardResponse>> {
        require("tracking number", &req.tracking_number)?;
        self.client.call(Method::POST, TRACKING, &[], Some(req))
    }

    pub fn delete_tracking(&self, tracking_id: &str) -> Result<Decoded<StandardResponse>> {
        require("tracking id", tracking_id)?;
        self.client
            .call::<_, ()>(Method::DELETE, TRACKING, &[("tracking_id", tracking_id)], None)
    }

    pub fn list_trackings(&self, device_id: Option<&str>) -> Result<Decoded<TrackingList>> {
        let query: Vec<(&str, &str)> = device_id
            .filter(|id| !id.is_empty())
            .map(|id| ("device_id", id))
            .into_iter()
            .collect();
        self.client.call::<_, ()>(Method::GET, TRACKING, &query, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_item_omits_missing_device() {
        let item = TrackingRequestItem {
            tracking_number: "1Z999".into(),
            device_id: None,
        };
        assert_eq!(
            serde_json::to_string(&item).unwrap(),
            r#"{"tracking_number":"1Z999"}"#
        );

        let bound = TrackingRequestItem {
            device_id: Some("dev-1".into()),
            ..item
        };
        assert_eq!(
            serde_json::to_string(&bound).unwrap(),
            r#"{"tracking_number":"1Z999","device_id":"dev-1"}"#
        );
    }

    #[test]
    fn login_response_tolerates_missing_fields() {
        let resp: AdminLoginResponse =
            serde_json::from_str(r#"{"session_token":"abc123"}"#).unwrap();
        assert_eq!(resp.session_token, "abc123");
        assert_eq!(resp.status_code, 0);
    }
}
