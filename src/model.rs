//! Domain entities: [`BBox`], [`Node`], [`Way`], [`Map`].
//!
//! The `Map` exclusively owns its `BBox`, `Node`s, and `Way`s; no `Node` or
//! `Way` references another directly — way-to-node linkage is by id only
//! (spec §3). Dropping a `Map` drops every owned `String`/`Vec` beneath it
//! through ordinary `Drop`; there is no separate `release` entry point to
//! implement (see `DESIGN.md`).

/// A bounding box in nanodegrees (10^-9 degree). At most one per [`Map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BBox {
    pub min_lon: i64,
    pub max_lon: i64,
    pub max_lat: i64,
    pub min_lat: i64,
}

/// A single (key, value) string pair attached to a [`Node`] or [`Way`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// A geographic point. `lat`/`lon` are in nanodegrees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub id: i64,
    pub lat: i64,
    pub lon: i64,
    pub tags: Vec<Tag>,
}

/// An ordered list of node-reference ids, typically a road, boundary, or
/// other linear feature. References are absolute ids after delta
/// reconstruction; they are not resolved against any particular `Node` — a
/// dangling reference is not an error at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Way {
    pub id: i64,
    pub refs: Vec<i64>,
    pub tags: Vec<Tag>,
}

/// The decoded in-memory map model: an optional bounding box plus the nodes
/// and ways encountered across every blob of the input, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    pub(crate) bbox: Option<BBox>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) ways: Vec<Way>,
}

impl Map {
    pub fn new() -> Map {
        Map::default()
    }

    /// The map's bounding box, if one was present in the HeaderBlock.
    pub fn bbox(&self) -> Option<&BBox> {
        self.bbox.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    /// Out-of-range indices return `None` rather than failing (spec §4.5).
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn way(&self, index: usize) -> Option<&Way> {
        self.ways.get(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    /// Finds a node by its OSM id via linear scan. The decode pipeline does
    /// not build a secondary id index (out of scope); callers needing
    /// repeated lookups should build their own.
    pub fn find_node(&self, id: i64) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_way(&self, id: i64) -> Option<&Way> {
        self.ways.iter().find(|w| w.id == id)
    }
}

impl Node {
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Out-of-range indices return `None` rather than failing.
    pub fn key(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(|t| t.key.as_str())
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(|t| t.value.as_str())
    }
}

impl Way {
    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    /// Out-of-range indices return `None` rather than failing.
    pub fn reference(&self, index: usize) -> Option<i64> {
        self.refs.get(index).copied()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(|t| t.key.as_str())
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(|t| t.value.as_str())
    }

    /// The value associated with `key`, or `None` if the way has no such
    /// tag. Used by the CLI's `-w ID KEY...` query.
    pub fn value_for_key(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn out_of_range_accessors_return_none() {
        let map = Map::new();
        assert_eq!(map.node(0), None);
        assert_eq!(map.way(0), None);
        assert_eq!(map.bbox(), None);

        let node = Node::default();
        assert_eq!(node.key(0), None);
        assert_eq!(node.value(0), None);

        let way = Way::default();
        assert_eq!(way.reference(0), None);
        assert_eq!(way.key(0), None);
    }

    #[test]
    fn way_value_for_key_finds_matched_tag_in_argument_order() {
        let way = Way {
            id: 1,
            refs: vec![],
            tags: vec![
                Tag { key: "highway".into(), value: "service".into() },
                Tag { key: "surface".into(), value: "asphalt".into() },
            ],
        };
        assert_eq!(way.value_for_key("highway"), Some("service"));
        assert_eq!(way.value_for_key("surface"), Some("asphalt"));
        assert_eq!(way.value_for_key("missing"), None);
    }

    #[test]
    fn find_node_and_way_by_id() {
        let mut map = Map::new();
        map.nodes.push(Node { id: 42, lat: 1, lon: 2, tags: vec![] });
        map.ways.push(Way { id: 7, refs: vec![1, 2, 3], tags: vec![] });

        assert_eq!(map.find_node(42).unwrap().lat, 1);
        assert!(map.find_node(999).is_none());
        assert_eq!(map.find_way(7).unwrap().refs, vec![1, 2, 3]);
    }
}
