use std::collections::HashSet;
use std::net::IpAddr;

/// Observed network state that conditions are evaluated against.
///
/// Built with chained setters:
///
/// ```
/// use nwam_rules::NetworkSnapshot;
///
/// let snap = NetworkSnapshot::new()
///     .ncu("net0")
///     .address("10.0.0.12".parse().unwrap())
///     .essid("office");
/// assert!(snap.is_ncu_active("net0"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    active_ncus: HashSet<String>,
    active_enms: HashSet<String>,
    active_location: Option<String>,
    addresses: Vec<IpAddr>,
    advertised_domains: Vec<String>,
    system_domain: Option<String>,
    essids: Vec<String>,
    bssids: Vec<String>,
}

impl NetworkSnapshot {
    /// Create a snapshot with nothing active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an NCU as active.
    #[must_use]
    pub fn ncu(mut self, name: &str) -> Self {
        self.active_ncus.insert(name.to_owned());
        self
    }

    /// Mark an ENM as active.
    #[must_use]
    pub fn enm(mut self, name: &str) -> Self {
        self.active_enms.insert(name.to_owned());
        self
    }

    /// Set the active location. Only one location is active at a time.
    #[must_use]
    pub fn location(mut self, name: &str) -> Self {
        self.active_location = Some(name.to_owned());
        self
    }

    /// Add an address assigned to any active interface.
    #[must_use]
    pub fn address(mut self, addr: IpAddr) -> Self {
        self.addresses.push(addr);
        self
    }

    /// Add a domain advertised via DHCP.
    #[must_use]
    pub fn advertised_domain(mut self, domain: &str) -> Self {
        self.advertised_domains.push(domain.to_owned());
        self
    }

    #[must_use]
    pub fn system_domain(mut self, domain: &str) -> Self {
        self.system_domain = Some(domain.to_owned());
        self
    }

    /// Add the ESSID of an associated wireless network.
    #[must_use]
    pub fn essid(mut self, essid: &str) -> Self {
        self.essids.push(essid.to_owned());
        self
    }

    #[must_use]
    pub fn bssid(mut self, bssid: &str) -> Self {
        self.bssids.push(bssid.to_owned());
        self
    }

    #[must_use]
    pub fn is_ncu_active(&self, name: &str) -> bool {
        self.active_ncus.contains(name)
    }

    #[must_use]
    pub fn is_enm_active(&self, name: &str) -> bool {
        self.active_enms.contains(name)
    }

    #[must_use]
    pub fn is_location_active(&self, name: &str) -> bool {
        self.active_location.as_deref() == Some(name)
    }

    #[must_use]
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    #[must_use]
    pub fn advertised_domains(&self) -> &[String] {
        &self.advertised_domains
    }

    /// The system domain as a slice, empty when unset.
    #[must_use]
    pub fn system_domains(&self) -> &[String] {
        self.system_domain.as_slice()
    }

    #[must_use]
    pub fn essids(&self) -> &[String] {
        &self.essids
    }

    #[must_use]
    pub fn bssids(&self) -> &[String] {
        &self.bssids
    }
}
