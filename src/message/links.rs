//! Deterministic URL templates embedded in notifications.
//!
//! Pure string builders, no network. Targets: the public node map, Google
//! Earth's web search view, the line-of-sight tool, and the support desk.

use url::form_urlencoded;

use crate::event::Building;

const MAP_BASE: &str = "https://www.nycmesh.net/map/nodes";
const EARTH_BASE: &str = "https://earth.google.com/web/search";
const LOS_BASE: &str = "https://los.nycmesh.net/search";
const TICKET_BASE: &str = "https://support.nycmesh.net/scp/tickets.php";

/// Map URL for a node or request id.
pub fn map_url(id: i64) -> String {
    format!("{MAP_BASE}/{id}")
}

/// Google Earth view of a building, camera preset to a rooftop vantage.
///
/// The address goes into the URL path with commas stripped and spaces
/// replaced by `+`, the way the Earth web app writes its own search URLs.
pub fn earth_url(building: &Building) -> String {
    let address = building.address.replace(',', "").replace(' ', "+");
    format!(
        "{EARTH_BASE}/{address}/@{lat},{lng},{alt}a,300d,40y,0.6h,65t,0r",
        lat = building.lat,
        lng = building.lng,
        alt = building.alt,
    )
}

/// Line-of-sight tool search for a building.
pub fn los_url(building: &Building) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("address", &building.address)
        .append_pair("bin", &building.bin.to_string())
        .append_pair("lat", &building.lat.to_string())
        .append_pair("lng", &building.lng.to_string())
        .finish();
    format!("{LOS_BASE}?{query}")
}

/// Support-desk ticket search for a request id.
pub fn ticket_url(request_id: i64) -> String {
    format!("{TICKET_BASE}?a=search&query={request_id}")
}
