use crate::types::SectionContext;

/// One drawing-section marker: a phrase that switches context when a line contains it.
#[derive(Debug, Clone, Copy)]
pub struct SectionMarker {
    pub phrase: &'static str,
    /// Lines also containing this word are left alone
    pub unless: Option<&'static str>,
    pub context: SectionContext,
}

/// Checked in order, first match wins.
/// Internal elevations share the "ELEVATION X" text but aren't comparable views.
pub const SECTION_MARKERS: &[SectionMarker] = &[
    SectionMarker {
        phrase: "PLAN VIEW - BASE",
        unless: None,
        context: SectionContext::PlanBase,
    },
    SectionMarker {
        phrase: "PLAN VIEW - WALL",
        unless: None,
        context: SectionContext::PlanWall,
    },
    SectionMarker {
        phrase: "PLAN VIEW - LOFT",
        unless: None,
        context: SectionContext::PlanLoft,
    },
    SectionMarker {
        phrase: "ELEVATION A",
        unless: Some("INTERNAL"),
        context: SectionContext::ElevationA,
    },
    SectionMarker {
        phrase: "ELEVATION B",
        unless: Some("INTERNAL"),
        context: SectionContext::ElevationB,
    },
    SectionMarker {
        phrase: "ELEVATION C",
        unless: Some("INTERNAL"),
        context: SectionContext::ElevationC,
    },
    SectionMarker {
        phrase: "ELEVATION D",
        unless: Some("INTERNAL"),
        context: SectionContext::ElevationD,
    },
    SectionMarker {
        phrase: "CONSOLIDATED CABINETS LIST",
        unless: None,
        context: SectionContext::Consolidated,
    },
];

/// Maps raw lines to drawing-section labels
pub struct LineClassifier {
    markers: &'static [SectionMarker],
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            markers: SECTION_MARKERS,
        }
    }

    /// Returns the section a line announces, or None to keep the current one
    pub fn classify(&self, line: &str) -> Option<SectionContext> {
        let upper = line.to_uppercase();
        self.markers
            .iter()
            .find(|marker| {
                upper.contains(marker.phrase)
                    && marker.unless.map_or(true, |word| !upper.contains(word))
            })
            .map(|marker| marker.context)
    }
}

/// Convenience wrapper over the default marker table
pub fn classify(line: &str) -> Option<SectionContext> {
    LineClassifier::new().classify(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_markers() {
        assert_eq!(classify("PLAN VIEW - BASE"), Some(SectionContext::PlanBase));
        assert_eq!(
            classify("kitchen plan view - wall cabinets"),
            Some(SectionContext::PlanWall)
        );
        assert_eq!(classify("Plan View - Loft  1:50"), Some(SectionContext::PlanLoft));
    }

    #[test]
    fn test_elevation_markers() {
        assert_eq!(classify("ELEVATION A"), Some(SectionContext::ElevationA));
        assert_eq!(classify("Elevation b - sink run"), Some(SectionContext::ElevationB));
        assert_eq!(classify("ELEVATION C"), Some(SectionContext::ElevationC));
        assert_eq!(classify("ELEVATION D"), Some(SectionContext::ElevationD));
    }

    #[test]
    fn test_internal_elevation_is_ignored() {
        assert_eq!(classify("ELEVATION A INTERNAL"), None);
        assert_eq!(classify("Internal Elevation B"), None);
    }

    #[test]
    fn test_consolidated_marker() {
        assert_eq!(
            classify("Consolidated Cabinets List"),
            Some(SectionContext::Consolidated)
        );
    }

    #[test]
    fn test_unlabelled_lines() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("B1 600x560x720"), None);
        assert_eq!(classify("PLAN VIEW"), None);
    }

    #[test]
    fn test_first_marker_wins() {
        assert_eq!(
            classify("PLAN VIEW - BASE see ELEVATION A"),
            Some(SectionContext::PlanBase)
        );
    }
}
