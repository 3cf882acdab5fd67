use serde::{Deserialize, Serialize};

/// Closed interval of page positions forming one incident.
///
/// Serialized as a two-element array `[start, end]`, the shape the save
/// endpoint expects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(start: usize, end: usize) -> Self {
        Segment { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }
}

impl From<(usize, usize)> for Segment {
    fn from((start, end): (usize, usize)) -> Self {
        Segment { start, end }
    }
}

impl From<Segment> for (usize, usize) {
    fn from(segment: Segment) -> Self {
        (segment.start, segment.end)
    }
}

/// Ordered list of segments for one document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct SegmentList(pub Vec<Segment>);

impl SegmentList {
    pub fn new() -> Self {
        SegmentList(Vec::new())
    }

    /// Groups pages into segments from their end markers.
    ///
    /// A page marked as segment end closes the current group unless it is the
    /// last page, so a mark on the final page never opens a trailing empty group.
    /// The final group is always closed at the end of the sequence, marked or not.
    pub fn from_end_markers(markers: &[bool]) -> Self {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (position, &is_end) in markers.iter().enumerate() {
            if groups.is_empty() {
                groups.push(Vec::new());
            }
            if let Some(group) = groups.last_mut() {
                group.push(position);
            }
            if is_end && position != markers.len() - 1 {
                groups.push(Vec::new());
            }
        }

        let segments = groups
            .into_iter()
            .filter_map(|group| match (group.first(), group.last()) {
                (Some(&first), Some(&last)) => Some(Segment::new(first, last)),
                _ => None,
            })
            .collect();
        SegmentList(segments)
    }

    /// Parses the JSON array-of-pairs representation.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serializes to the JSON array-of-pairs representation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    /// Largest `end` in the list, if any.
    pub fn max_end(&self) -> Option<usize> {
        self.0.iter().map(|s| s.end).max()
    }

    /// True when the segments are sorted, contiguous and cover `0..page_count`
    /// exactly once.
    pub fn is_partition_of(&self, page_count: usize) -> bool {
        if page_count == 0 {
            return self.0.is_empty();
        }
        let mut next_start = 0;
        for segment in &self.0 {
            if segment.start != next_start || segment.end < segment.start {
                return false;
            }
            next_start = segment.end + 1;
        }
        next_start == page_count
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<(usize, usize)>> for SegmentList {
    fn from(pairs: Vec<(usize, usize)>) -> Self {
        SegmentList(pairs.into_iter().map(Segment::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(len: usize, ends: &[usize]) -> Vec<bool> {
        (0..len).map(|i| ends.contains(&i)).collect()
    }

    #[test]
    fn test_empty_sequence_yields_no_segments() {
        assert!(SegmentList::from_end_markers(&[]).is_empty());
    }

    #[test]
    fn test_single_unmarked_page_is_one_segment() {
        let list = SegmentList::from_end_markers(&[false]);
        assert_eq!(list, SegmentList::from(vec![(0, 0)]));
    }

    #[test]
    fn test_ends_split_groups() {
        let list = SegmentList::from_end_markers(&markers(5, &[1, 4]));
        assert_eq!(list, SegmentList::from(vec![(0, 1), (2, 4)]));
    }

    #[test]
    fn test_mark_on_last_page_adds_no_trailing_group() {
        let list = SegmentList::from_end_markers(&markers(3, &[2]));
        assert_eq!(list, SegmentList::from(vec![(0, 2)]));
    }

    #[test]
    fn test_every_page_marked() {
        let list = SegmentList::from_end_markers(&[true, true, true]);
        assert_eq!(list, SegmentList::from(vec![(0, 0), (1, 1), (2, 2)]));
    }

    #[test]
    fn test_derived_lists_partition_the_pages() {
        for len in 1..=8usize {
            for mask in 0u32..(1 << len) {
                let marks: Vec<bool> = (0..len).map(|i| mask & (1 << i) != 0).collect();
                let list = SegmentList::from_end_markers(&marks);
                assert!(list.is_partition_of(len), "mask {mask:#b} len {len}: {list:?}");
            }
        }
    }

    #[test]
    fn test_json_shape_is_array_of_pairs() {
        let list = SegmentList::from(vec![(0, 2), (3, 5)]);
        assert_eq!(list.to_json().unwrap(), "[[0,2],[3,5]]");
        assert_eq!(SegmentList::from_json("[[0,2],[3,5]]").unwrap(), list);
    }

    #[test]
    fn test_is_partition_rejects_gaps_and_overlaps() {
        assert!(!SegmentList::from(vec![(0, 1), (3, 4)]).is_partition_of(5));
        assert!(!SegmentList::from(vec![(0, 2), (2, 4)]).is_partition_of(5));
        assert!(!SegmentList::from(vec![(0, 1)]).is_partition_of(5));
        assert!(SegmentList::new().is_partition_of(0));
    }

    #[test]
    fn test_segment_len_and_contains() {
        let segment = Segment::new(2, 4);
        assert_eq!(segment.len(), 3);
        assert!(segment.contains(3));
        assert!(!segment.contains(5));
    }
}
