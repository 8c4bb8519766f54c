#![forbid(unsafe_code)]

//! Filter resources: the `<filter>` + `<feGaussianBlur>` pair behind a blur.
//!
//! A target element `rect1` owns at most one resource, located by
//! convention at id `rect1_blur` inside the document's `<defs>`:
//!
//! ```text
//! <defs>
//!   <filter id="rect1_blur" [x y width height]>
//!     <feGaussianBlur in="SourceGraphic" stdDeviation="5"/>
//!   </filter>
//! </defs>
//! <rect id="rect1" filter="url(#rect1_blur)"/>
//! ```

use svgedit_core::{Document, DocumentError, ID_ATTR, NodeId};

use super::BlurError;

/// Tag of the filter wrapper.
pub const FILTER_TAG: &str = "filter";
/// Tag of the blur primitive.
pub const BLUR_PRIMITIVE_TAG: &str = "feGaussianBlur";
/// Deviation attribute on the primitive.
pub const STD_DEVIATION_ATTR: &str = "stdDeviation";
/// Attribute on the target referencing its filter.
pub const FILTER_ATTR: &str = "filter";
/// Suffix appended to a target id to name its filter.
pub const FILTER_ID_SUFFIX: &str = "_blur";

/// Id of the filter belonging to `target_id`.
#[must_use]
pub fn filter_id(target_id: &str) -> String {
    format!("{target_id}{FILTER_ID_SUFFIX}")
}

/// `filter` attribute value referencing the filter of `target_id`.
#[must_use]
pub fn filter_url(target_id: &str) -> String {
    format!("url(#{target_id}{FILTER_ID_SUFFIX})")
}

/// A located or freshly created filter resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterResource {
    /// The `<filter>` wrapper.
    pub filter: NodeId,
    /// Its `<feGaussianBlur>` first child.
    pub primitive: NodeId,
}

impl FilterResource {
    /// Find the resource belonging to `target_id`.
    ///
    /// Fails instead of guessing when an element carries the conventional id
    /// but does not have the expected shape.
    pub fn locate(doc: &Document, target_id: &str) -> Result<Option<Self>, BlurError> {
        let id = filter_id(target_id);
        let Some(filter) = doc.find_by_id(&id) else {
            return Ok(None);
        };
        if doc.tag(filter) != Some(FILTER_TAG) {
            return Err(BlurError::InconsistentResource {
                filter_id: id,
                reason: "element is not a filter",
            });
        }
        let primitive = doc
            .first_child(filter)
            .filter(|&child| doc.tag(child) == Some(BLUR_PRIMITIVE_TAG))
            .ok_or(BlurError::InconsistentResource {
                filter_id: id,
                reason: "first child is not a feGaussianBlur",
            })?;
        Ok(Some(Self { filter, primitive }))
    }

    /// Build a resource for `target_id` and append it to `<defs>`.
    pub fn create(
        doc: &mut Document,
        target_id: &str,
        std_deviation: f64,
    ) -> Result<Self, DocumentError> {
        let primitive = doc.create_element(
            BLUR_PRIMITIVE_TAG,
            [
                ("in", "SourceGraphic".to_owned()),
                (STD_DEVIATION_ATTR, format_deviation(std_deviation)),
            ],
        );
        let filter = doc.create_element(FILTER_TAG, [(ID_ATTR, filter_id(target_id))]);
        doc.append_child(filter, primitive)?;
        let defs = doc.defs()?;
        doc.append_child(defs, filter)?;
        Ok(Self { filter, primitive })
    }

    /// Current deviation, if the attribute parses.
    #[must_use]
    pub fn std_deviation(&self, doc: &Document) -> Option<f64> {
        doc.attribute(self.primitive, STD_DEVIATION_ATTR)?
            .trim()
            .parse()
            .ok()
    }

    /// Write a deviation onto the primitive without recording history.
    pub fn write_std_deviation(&self, doc: &mut Document, value: f64) -> Result<(), DocumentError> {
        doc.set_attribute(self.primitive, STD_DEVIATION_ATTR, format_deviation(value))?;
        Ok(())
    }
}

/// Attribute text for a deviation (`5.0` → `"5"`, `2.5` → `"2.5"`).
#[must_use]
pub fn format_deviation(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_convention() {
        assert_eq!(filter_id("rect1"), "rect1_blur");
        assert_eq!(filter_url("rect1"), "url(#rect1_blur)");
    }

    #[test]
    fn deviation_formatting() {
        assert_eq!(format_deviation(5.0), "5");
        assert_eq!(format_deviation(2.5), "2.5");
        assert_eq!(format_deviation(0.1), "0.1");
    }

    #[test]
    fn create_then_locate() {
        let mut doc = Document::new();
        let created = FilterResource::create(&mut doc, "rect1", 5.0).unwrap();

        let defs = doc.find_defs().unwrap();
        assert_eq!(doc.parent(created.filter), Some(defs));
        assert_eq!(doc.children(created.filter), &[created.primitive]);
        assert_eq!(doc.attribute(created.primitive, "in"), Some("SourceGraphic"));
        assert_eq!(created.std_deviation(&doc), Some(5.0));

        let located = FilterResource::locate(&doc, "rect1").unwrap();
        assert_eq!(located, Some(created));
        assert_eq!(FilterResource::locate(&doc, "rect2").unwrap(), None);
    }

    #[test]
    fn write_updates_primitive() {
        let mut doc = Document::new();
        let res = FilterResource::create(&mut doc, "r", 1.0).unwrap();
        res.write_std_deviation(&mut doc, 7.25).unwrap();
        assert_eq!(doc.attribute(res.primitive, STD_DEVIATION_ATTR), Some("7.25"));
        assert_eq!(res.std_deviation(&doc), Some(7.25));
    }

    #[test]
    fn wrong_tag_is_inconsistent() {
        let mut doc = Document::new();
        let impostor = doc.create_element("g", [("id", "rect1_blur")]);
        doc.append_child(doc.root(), impostor).unwrap();
        let err = FilterResource::locate(&doc, "rect1").unwrap_err();
        assert!(matches!(err, BlurError::InconsistentResource { .. }));
    }

    #[test]
    fn missing_primitive_is_inconsistent() {
        let mut doc = Document::new();
        let defs = doc.defs().unwrap();
        let filter = doc.create_element(FILTER_TAG, [("id", "rect1_blur")]);
        doc.append_child(defs, filter).unwrap();

        let err = FilterResource::locate(&doc, "rect1").unwrap_err();
        assert_eq!(
            err,
            BlurError::InconsistentResource {
                filter_id: "rect1_blur".into(),
                reason: "first child is not a feGaussianBlur",
            }
        );
    }
}
