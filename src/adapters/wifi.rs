//! WiFi station-mode bring-up.
//!
//! The UDP command socket needs an IP interface; this adapter joins the
//! configured access point once at boot and blocks until the netif is up.
//! Credentials are baked in at build time from `STATION_WIFI_SSID` and
//! `STATION_WIFI_PASS`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` over
//!   the modem peripheral.
//! - **all other targets**: only credential validation (host tests).

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

impl<'a> Credentials<'a> {
    /// Validate and wrap a credential pair.
    pub fn new(ssid: &'a str, password: &'a str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self { ssid, password })
    }

    /// Credentials compiled into the firmware image.
    pub fn from_build_env() -> Result<Credentials<'static>, ConnectivityError> {
        let ssid = option_env!("STATION_WIFI_SSID").ok_or(ConnectivityError::NoCredentials)?;
        let password = option_env!("STATION_WIFI_PASS").unwrap_or("");
        Credentials::new(ssid, password)
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Station bring-up (ESP32)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn connect_station(
    modem: esp_idf_svc::hal::modem::Modem,
    sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    credentials: &Credentials<'_>,
) -> Result<
    esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ConnectivityError,
> {
    use esp_idf_svc::wifi::{
        AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
    };
    use log::{info, warn};

    let failed = |stage: &'static str| {
        move |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: {} failed ({})", stage, e);
            ConnectivityError::ConnectionFailed
        }
    };

    let driver = EspWifi::new(modem, sysloop.clone(), None).map_err(failed("driver init"))?;
    let mut wifi = BlockingWifi::wrap(driver, sysloop).map_err(failed("event wrap"))?;

    let config = Configuration::Client(ClientConfiguration {
        ssid: credentials
            .ssid
            .try_into()
            .map_err(|_| ConnectivityError::InvalidSsid)?,
        password: credentials
            .password
            .try_into()
            .map_err(|_| ConnectivityError::InvalidPassword)?,
        auth_method: if credentials.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    });
    wifi.set_configuration(&config)
        .map_err(failed("set configuration"))?;

    info!("WiFi: connecting to '{}'", credentials.ssid);
    wifi.start().map_err(failed("start"))?;
    wifi.connect().map_err(failed("connect"))?;
    wifi.wait_netif_up().map_err(failed("netif up"))?;

    if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
        info!("WiFi: connected, ip={}", ip.ip);
    }
    Ok(wifi)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
