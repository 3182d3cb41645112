//! Event composition rules.
//!
//! One pure function per event kind, joined by an exhaustive [`compose`].
//! Exact output strings are part of the contract with the notification
//! channels; tests pin them.

use chrono::NaiveDateTime;

use crate::event::{Appointment, Building, Event, JoinRequest, Pano, VisibleNode};
use crate::message::blocks::{Block, ButtonStyle, Element};
use crate::message::{links, ComposeError, MessagePayload};

/// Date pattern used everywhere a date appears, e.g. `Thursday, Mar 14 6:30 PM`.
const DATE_PATTERN: &str = "%A, %b %-d %-I:%M %p";

/// Feet-to-meters factor applied to roof altitudes.
const FEET_TO_METERS: f64 = 0.328;

/// Interaction value the panorama buttons post back. Button handling
/// lives in a different system; the value is a fixed placeholder.
const PANO_BUTTON_VALUE: &str = "click_me_123";

/// Compose a chat message for any event.
///
/// # Errors
///
/// Returns [`ComposeError::EmptyField`] when the event carries an empty
/// address, member name, or panorama URL.
pub fn compose(event: &Event) -> Result<MessagePayload, ComposeError> {
    match event {
        Event::JoinRequest {
            request,
            building,
            visible_nodes,
        } => compose_join_request(request, building, visible_nodes.as_deref()),
        Event::Panorama { pano } => compose_pano(pano),
        Event::Appointment { appointment } => compose_appointment(appointment),
    }
}

/// Compose the join-request announcement: one markdown section with a
/// linked title, an altitude/roof/line-of-sight info line, and a links
/// line. The plain text is the address joined to the same info line.
///
/// # Errors
///
/// Returns [`ComposeError::EmptyField`] when the building address is empty.
pub fn compose_join_request(
    request: &JoinRequest,
    building: &Building,
    visible_nodes: Option<&[VisibleNode]>,
) -> Result<MessagePayload, ComposeError> {
    if building.address.is_empty() {
        return Err(ComposeError::EmptyField("building.address"));
    }

    let address = &building.address;
    let alt_meters = (building.alt * FEET_TO_METERS).round();
    let roof = if request.roof_access {
        "Roof access"
    } else {
        "No roof access"
    };
    let los = los_summary(visible_nodes);
    let map_url = links::map_url(request.id);

    let title = format!("*<{map_url}|{address}>*");
    let info = format!("{alt_meters:.0}m · {roof} · {los}");
    let links_text = links_line(building, request.id);

    Ok(MessagePayload {
        text: format!("{address} · {info}"),
        blocks: vec![Block::markdown(format!("{title}\n{info}\n{links_text}"))],
    })
}

/// Compose the panorama announcement: the image followed by
/// schedule/no-line-of-sight buttons.
///
/// # Errors
///
/// Returns [`ComposeError::EmptyField`] when the image URL is empty.
pub fn compose_pano(pano: &Pano) -> Result<MessagePayload, ComposeError> {
    if pano.url.is_empty() {
        return Err(ComposeError::EmptyField("pano.url"));
    }

    Ok(MessagePayload {
        text: format!("New pano for {}!", pano.node_id),
        blocks: vec![
            Block::image("Panorama 1", pano.url.clone()),
            Block::actions(vec![
                Element::button("Schedule Install", ButtonStyle::Primary, PANO_BUTTON_VALUE),
                Element::button("No Line of Sight", ButtonStyle::Danger, PANO_BUTTON_VALUE),
            ]),
        ],
    })
}

/// Compose the install-team announcement for an appointment: intro,
/// contact info, links, and an availability prompt, one markdown section
/// each. Used for the initial send and reused by the reschedule flow to
/// regenerate the edited message body.
///
/// # Errors
///
/// Returns [`ComposeError::EmptyField`] when the building address or the
/// member name is empty.
pub fn compose_appointment(appointment: &Appointment) -> Result<MessagePayload, ComposeError> {
    let building = &appointment.building;
    let member = &appointment.member;
    if building.address.is_empty() {
        return Err(ComposeError::EmptyField("building.address"));
    }
    if member.name.is_empty() {
        return Err(ComposeError::EmptyField("member.name"));
    }

    let kind = appointment.kind;
    let address = &building.address;
    let date = format_date(appointment.date);
    let name = &member.name;
    let phone = &member.phone;
    let email = &member.email;
    let node_id = appointment.node_id;
    let map_url = links::map_url(appointment.request_id);

    let intro = format!("New {kind}:\n*{address}*\n{date}");
    let mut info = format!(
        "*Name:*\t{name}\n*Phone:*\t<tel:{phone}|{phone}>\n*Email:*\t{email}\n*Node:*\t<{map_url}|{node_id}>\n"
    );
    if let Some(notes) = appointment.notes.as_deref().filter(|n| !n.is_empty()) {
        info.push_str(&format!("*Notes:*\t{notes}"));
    }
    let links_text = links_line(building, appointment.request_id);

    Ok(MessagePayload {
        text: format!("New {kind}:\n{address}\n{date}"),
        blocks: vec![
            Block::markdown(intro),
            Block::markdown(info),
            Block::markdown(links_text),
            Block::markdown("Are you available? Thread here"),
        ],
    })
}

/// The broadcast thread reply announcing a rescheduled appointment.
pub fn reschedule_note(appointment: &Appointment) -> String {
    format!("Rescheduled to {}", format_date(appointment.date))
}

/// Render a date in the fixed notification pattern.
pub fn format_date(date: NaiveDateTime) -> String {
    date.format(DATE_PATTERN).to_string()
}

/// Summarize a line-of-sight query result.
///
/// `None` means the lookup itself failed; an empty list means it ran and
/// saw nothing. Otherwise nodes with at least one identified device are
/// listed by name (or id when unnamed), comma-separated. A list whose
/// nodes all lack identified hardware collapses to an empty string.
pub fn los_summary(visible_nodes: Option<&[VisibleNode]>) -> String {
    let Some(nodes) = visible_nodes else {
        return "LoS Failed".to_string();
    };
    if nodes.is_empty() {
        return "No LoS".to_string();
    }

    let has_known_device =
        |node: &&VisibleNode| node.devices.iter().any(|d| d.device_type.name != "Unknown");
    let identifier = |node: &VisibleNode| match node.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => node.id.to_string(),
    };

    nodes
        .iter()
        .filter(has_known_device)
        .map(identifier)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The Earth/LoS/Ticket links line shared by join-request and
/// appointment messages.
fn links_line(building: &Building, ticket_id: i64) -> String {
    let earth_url = links::earth_url(building);
    let los_url = links::los_url(building);
    let ticket_url = links::ticket_url(ticket_id);
    format!("<{earth_url}|Earth →>\t<{los_url}|LoS →>\t<{ticket_url}|Ticket →>")
}
