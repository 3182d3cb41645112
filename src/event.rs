//! Domain events and the records they carry.
//!
//! Events are produced by the surrounding application (or read from JSON by
//! the CLI) and consumed exactly once by [`crate::message::compose`]. They
//! are immutable value types; each variant carries only the records its
//! formatting rules need.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A notification-worthy happening in the mesh network, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Someone asked to join the network.
    JoinRequest {
        /// The join request itself.
        request: JoinRequest,
        /// The building the request was filed for.
        building: Building,
        /// Nodes visible from the rooftop; `None` when the lookup failed.
        visible_nodes: Option<Vec<VisibleNode>>,
    },
    /// A rooftop panorama was uploaded.
    Panorama {
        /// The stored panorama.
        pano: Pano,
    },
    /// A visit was scheduled (or rescheduled) for a member's building.
    Appointment {
        /// The appointment record.
        appointment: Appointment,
    },
}

/// A request to join the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Database identifier, also the support-ticket search key.
    pub id: i64,
    /// Whether the requester reported roof access.
    pub roof_access: bool,
}

/// A building a request or appointment refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Street address.
    pub address: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Roof altitude in feet.
    pub alt: f64,
    /// Municipal building identification number, used by the
    /// line-of-sight service.
    pub bin: i64,
}

/// Contact details of a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Full name.
    pub name: String,
    /// Phone number, rendered as a dial-able link.
    pub phone: String,
    /// Email address.
    pub email: String,
}

/// A stored rooftop panorama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pano {
    /// Public image URL.
    pub url: String,
    /// Node the panorama belongs to.
    pub node_id: i64,
}

/// The category of work an appointment books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentKind {
    /// First-time installation of a rooftop node.
    Install,
    /// Support visit for an existing node.
    Support,
    /// Site survey ahead of an install.
    Survey,
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "Install",
            Self::Support => "Support",
            Self::Survey => "Survey",
        };
        f.write_str(name)
    }
}

/// A scheduled visit to a member's building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// What kind of visit this is.
    pub kind: AppointmentKind,
    /// Wall-clock date and time of the visit. No timezone; rendered as-is.
    pub date: NaiveDateTime,
    /// Join request the appointment belongs to.
    pub request_id: i64,
    /// Node the visit concerns.
    pub node_id: i64,
    /// Free-text notes from scheduling, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// The building to visit.
    pub building: Building,
    /// Who to meet there.
    pub member: Member,
}

/// A node visible from a rooftop, as returned by the line-of-sight query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleNode {
    /// Node identifier.
    pub id: i64,
    /// Display name, if the node has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Devices installed at the node.
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// A device installed at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// The device's hardware type.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

/// A device hardware type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    /// Type name; `"Unknown"` marks unidentified hardware.
    pub name: String,
}
