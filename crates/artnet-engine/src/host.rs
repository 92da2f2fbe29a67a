//! Host-facing controller
//!
//! A thin wrapper over [`ArtNetEngine`] with the flat, boolean-returning
//! surface a scripting host binds to. Errors are logged and turned into
//! `false`; nothing here panics on bad host input.

use crate::{
    address::UniverseAddress,
    config::ArtNetSettings,
    engine::{ArtNetEngine, SendReport},
    error::ArtNetError,
    Result,
};

/// Art-Net controller exposed to the host application
#[derive(Debug, Default)]
pub struct ArtNetController {
    engine: ArtNetEngine,
}

impl ArtNetController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store the network and universe settings
    pub fn configure(
        &self,
        bind_address: &str,
        port: i64,
        net: i64,
        subnet: i64,
        universe: i64,
        broadcast_address: &str,
    ) -> bool {
        let settings = host_settings(bind_address, port, net, subnet, universe, broadcast_address);

        report(
            "configure",
            settings.and_then(|settings| self.engine.configure(&settings)),
        )
    }

    /// [`configure`](Self::configure) with the limited broadcast destination
    pub fn configure_broadcast(
        &self,
        bind_address: &str,
        port: i64,
        net: i64,
        subnet: i64,
        universe: i64,
    ) -> bool {
        self.configure(
            bind_address,
            port,
            net,
            subnet,
            universe,
            &std::net::Ipv4Addr::BROADCAST.to_string(),
        )
    }

    pub fn start(&self) -> bool {
        report("start", self.engine.start())
    }

    pub fn stop(&self) {
        self.engine.stop();
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Stage channel data
    ///
    /// `universe` is a 15-bit Port-Address (0-32767); a negative value
    /// targets the configured base universe. Data beyond 512 channels is
    /// dropped with a warning and still counts as success.
    pub fn set_dmx_data(&self, universe: i64, data: &[u8]) -> bool {
        let result = resolve_universe(universe)
            .and_then(|address| self.engine.set_dmx_data(address, data));
        report("set_dmx_data", result)
    }

    pub fn send_dmx(&self) -> bool {
        report::<SendReport>("send_dmx", self.engine.send_dmx())
    }

    /// The wrapped engine, for hosts that want typed results
    pub fn engine(&self) -> &ArtNetEngine {
        &self.engine
    }
}

impl Drop for ArtNetController {
    fn drop(&mut self) {
        self.engine.stop();
    }
}

fn host_settings(
    bind_address: &str,
    port: i64,
    net: i64,
    subnet: i64,
    universe: i64,
    broadcast_address: &str,
) -> Result<ArtNetSettings> {
    Ok(ArtNetSettings::new(bind_address, non_negative("port", port)?)
        .with_address(
            non_negative("net", net)?,
            non_negative("subnet", subnet)?,
            non_negative("universe", universe)?,
        )
        .with_destination(broadcast_address))
}

fn non_negative(field: &'static str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ArtNetError::invalid_config(field, format!("{} is out of range", value)))
}

fn resolve_universe(universe: i64) -> Result<Option<UniverseAddress>> {
    if universe < 0 {
        return Ok(None);
    }
    let port_address = u16::try_from(universe).map_err(|_| {
        ArtNetError::invalid_config(
            "universe",
            format!("port address {} is out of range", universe),
        )
    })?;
    UniverseAddress::from_port_address(port_address).map(Some)
}

fn report<T>(operation: &str, result: Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Art-Net {} failed: {}", operation, e);
            false
        }
    }
}
