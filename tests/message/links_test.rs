//! URL template tests.

use meshline::event::Building;
use meshline::message::links::{earth_url, los_url, map_url, ticket_url};

fn building() -> Building {
    Building {
        address: "115 Broadway, New York, NY".to_owned(),
        lat: 40.708,
        lng: -74.0107,
        alt: 120.0,
        bin: 1_001_234,
    }
}

#[test]
fn map_url_appends_the_id() {
    assert_eq!(map_url(9147), "https://www.nycmesh.net/map/nodes/9147");
}

#[test]
fn earth_url_strips_commas_and_joins_with_plus() {
    assert_eq!(
        earth_url(&building()),
        "https://earth.google.com/web/search/115+Broadway+New+York+NY/@40.708,-74.0107,120a,300d,40y,0.6h,65t,0r"
    );
}

#[test]
fn los_url_form_encodes_the_query() {
    assert_eq!(
        los_url(&building()),
        "https://los.nycmesh.net/search?address=115+Broadway%2C+New+York%2C+NY&bin=1001234&lat=40.708&lng=-74.0107"
    );
}

#[test]
fn ticket_url_targets_the_search_endpoint() {
    assert_eq!(
        ticket_url(427),
        "https://support.nycmesh.net/scp/tickets.php?a=search&query=427"
    );
}
