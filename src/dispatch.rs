//! Routes decoded link events to typed robot events.
//!
//! Dispatch is synchronous with arrival and allocation-light since it runs
//! on the transport's delivery path. Unrecognized tags are ignored.

use crate::link::{Body, Frame, LinkEvent, Tag};

/// Typed message from the robot, ready for the session layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotEvent {
    /// Full map record text (`x;y;orientation;originRow;originCol;JSON`)
    MapUpdate(String),
    /// Encoded camera frame, passed through opaque to the display layer
    CameraFrame(Vec<u8>),
    /// Camera stream resolution
    CameraResolution { width: u32, height: u32 },
    /// Link terminated; all session state must be reset
    Disconnected,
}

/// Route one link event. Returns `None` for unknown tags and for frames
/// whose payload kind doesn't match the tag's contract.
pub fn dispatch(event: LinkEvent) -> Option<RobotEvent> {
    let frame = match event {
        LinkEvent::Frame(frame) => frame,
        LinkEvent::Disconnected => return Some(RobotEvent::Disconnected),
    };

    match (frame.tag, frame.body) {
        (Tag::MAP, Body::Text(text)) => Some(RobotEvent::MapUpdate(text)),
        (Tag::IMAGE, Body::Bytes(bytes)) => Some(RobotEvent::CameraFrame(bytes)),
        (Tag::RESOLUTION, Body::Text(text)) => parse_resolution(&text),
        (tag, _) => {
            log::trace!("Ignoring frame with unrecognized tag '{}'", tag);
            None
        }
    }
}

fn parse_resolution(text: &str) -> Option<RobotEvent> {
    let (w, h) = text.split_once(';')?;
    match (w.trim().parse(), h.trim().parse()) {
        (Ok(width), Ok(height)) => Some(RobotEvent::CameraResolution { width, height }),
        _ => {
            log::warn!("Malformed resolution payload: {:?}", text);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_map_text() {
        let event = LinkEvent::Frame(Frame::text(Tag::MAP, "0;0;0;0;0;[[0.5]]"));
        assert_eq!(
            dispatch(event),
            Some(RobotEvent::MapUpdate("0;0;0;0;0;[[0.5]]".to_string()))
        );
    }

    #[test]
    fn routes_camera_frame_bytes() {
        let event = LinkEvent::Frame(Frame::bytes(Tag::IMAGE, vec![9, 8]));
        assert_eq!(dispatch(event), Some(RobotEvent::CameraFrame(vec![9, 8])));
    }

    #[test]
    fn parses_resolution() {
        let event = LinkEvent::Frame(Frame::text(Tag::RESOLUTION, "640;480"));
        assert_eq!(
            dispatch(event),
            Some(RobotEvent::CameraResolution {
                width: 640,
                height: 480
            })
        );
    }

    #[test]
    fn unknown_tag_is_ignored() {
        let event = LinkEvent::Frame(Frame::text(Tag(*b"Xyz"), "whatever"));
        assert_eq!(dispatch(event), None);
    }

    #[test]
    fn malformed_resolution_is_dropped() {
        let event = LinkEvent::Frame(Frame::text(Tag::RESOLUTION, "640x480"));
        assert_eq!(dispatch(event), None);
    }

    #[test]
    fn disconnect_sentinel_maps_through() {
        assert_eq!(dispatch(LinkEvent::Disconnected), Some(RobotEvent::Disconnected));
    }
}
