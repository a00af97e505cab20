//! Domain decoder: translates `HeaderBlock` and `PrimitiveBlock` messages
//! into the [`Map`] model, applying zigzag and delta decoding and expanding
//! packed repeated fields (spec §4.4).

use crate::error::{Error, Result};
use crate::model::{BBox, Map, Node, Tag, Way};
use crate::schema::*;
use crate::varint::zigzag_decode;
use crate::wire::{ExpectedType, FieldValue, Message, WireType};
use log::{debug, warn};

/// Decodes a HeaderBlock's optional HeaderBBox sub-message into a [`BBox`].
/// If any of the four component fields is missing, the bounding box is
/// treated as entirely absent rather than a fatal error (spec §4.4).
pub fn decode_header_block(msg: &Message) -> Result<Option<BBox>> {
    let bbox_field = match msg.get_field(HEADER_BLOCK_BBOX, ExpectedType::Type(WireType::Len)) {
        Some(c) => c,
        None => return Ok(None),
    };
    let buf = msg.field_at(bbox_field).value.as_len().unwrap();
    let bbox_msg = Message::read_embedded(buf)?;

    let read_signed = |number: u32| -> Option<i64> {
        bbox_msg
            .get_field(number, ExpectedType::Type(WireType::Varint))
            .map(|c| zigzag_decode(bbox_msg.field_at(c).value.as_varint().unwrap()))
    };

    let min_lon = read_signed(HEADER_BBOX_LEFT);
    let max_lon = read_signed(HEADER_BBOX_RIGHT);
    let max_lat = read_signed(HEADER_BBOX_TOP);
    let min_lat = read_signed(HEADER_BBOX_BOTTOM);

    match (min_lon, max_lon, max_lat, min_lat) {
        (Some(min_lon), Some(max_lon), Some(max_lat), Some(min_lat)) => Ok(Some(BBox {
            min_lon,
            max_lon,
            max_lat,
            min_lat,
        })),
        _ => {
            debug!("HeaderBBox missing one or more of its four fields; treating bbox as absent");
            Ok(None)
        }
    }
}

/// Decodes a PrimitiveBlock: expands its StringTable, then walks every
/// PrimitiveGroup appending decoded nodes and ways to `map` in encounter
/// order. Node/Relation/ChangeSet groups are skipped silently (non-goals).
pub fn decode_primitive_block(msg: &Message, map: &mut Map) -> Result<()> {
    let strings = decode_string_table(msg)?;

    let mut cursor = None;
    loop {
        cursor = msg.next_field(
            cursor,
            PRIMITIVE_BLOCK_PRIMITIVEGROUP,
            ExpectedType::Type(WireType::Len),
            crate::wire::Direction::Forward,
        );
        let cursor = match cursor {
            Some(c) => c,
            None => break,
        };
        let buf = msg.field_at(cursor).value.as_len().unwrap();
        let group = Message::read_embedded(buf)?;
        decode_primitive_group(&group, &strings, map)?;
    }

    Ok(())
}

fn decode_string_table(block: &Message) -> Result<Vec<String>> {
    let table_field = match block.get_field(
        PRIMITIVE_BLOCK_STRINGTABLE,
        ExpectedType::Type(WireType::Len),
    ) {
        Some(c) => c,
        None => return Ok(Vec::new()),
    };
    let buf = block.field_at(table_field).value.as_len().unwrap();
    let table_msg = Message::read_embedded(buf)?;
    // s is itself a LEN field, one per string; it is already primitive (raw
    // bytes), so no packed expansion is needed — just collect in order.
    let mut strings = Vec::new();
    for field in table_msg.fields() {
        if field.number == STRINGTABLE_S {
            if let FieldValue::Len(bytes) = &field.value {
                strings.push(String::from_utf8_lossy(bytes).into_owned());
            }
        }
    }
    Ok(strings)
}

/// Resolves a StringTable index to a string, treating an out-of-range index
/// as an empty string rather than a fatal error (spec §4.4, §7).
fn resolve_string(strings: &[String], index: u64) -> String {
    match strings.get(index as usize) {
        Some(s) => s.clone(),
        None => {
            warn!("StringTable index {} out of range ({} entries); using empty string", index, strings.len());
            String::new()
        }
    }
}

fn decode_primitive_group(group: &Message, strings: &[String], map: &mut Map) -> Result<()> {
    if let Some(dense_field) =
        group.get_field(PRIMITIVE_GROUP_DENSE, ExpectedType::Type(WireType::Len))
    {
        let buf = group.field_at(dense_field).value.as_len().unwrap();
        let dense_msg = Message::read_embedded(buf)?;
        decode_dense_nodes(&dense_msg, map)?;
    }

    let mut cursor = None;
    loop {
        cursor = group.next_field(
            cursor,
            PRIMITIVE_GROUP_WAYS,
            ExpectedType::Type(WireType::Len),
            crate::wire::Direction::Forward,
        );
        let cursor = match cursor {
            Some(c) => c,
            None => break,
        };
        let buf = group.field_at(cursor).value.as_len().unwrap();
        let way_msg = Message::read_embedded(buf)?;
        map.ways.push(decode_way(&way_msg, strings)?);
    }

    if group
        .get_field(PRIMITIVE_GROUP_NODES, ExpectedType::Any)
        .is_some()
    {
        debug!("skipping unimplemented plain Node entities in PrimitiveGroup");
    }
    if group
        .get_field(PRIMITIVE_GROUP_RELATIONS, ExpectedType::Any)
        .is_some()
    {
        debug!("skipping unimplemented Relation entities in PrimitiveGroup");
    }
    if group
        .get_field(PRIMITIVE_GROUP_CHANGESETS, ExpectedType::Any)
        .is_some()
    {
        debug!("skipping unimplemented ChangeSet entities in PrimitiveGroup");
    }

    Ok(())
}

/// Expands the three packed, zigzag+delta-coded parallel arrays of a
/// DenseNodes sub-message and iterates them in lockstep, maintaining
/// running sums starting at zero. Fails with [`Error::Malformed`] if the
/// three expansions differ in length (design note §9.4: the source's
/// `&&`-chained `next_field` iteration breaks silently on mismatch; this
/// reimplementation expands each into an owned array first and checks).
fn decode_dense_nodes(dense: &Message, map: &mut Map) -> Result<()> {
    let mut dense = dense.clone();
    dense.expand_packed(DENSE_NODES_ID, PACKED_VARINT)?;
    dense.expand_packed(DENSE_NODES_LAT, PACKED_VARINT)?;
    dense.expand_packed(DENSE_NODES_LON, PACKED_VARINT)?;

    let ids = collect_varints(&dense, DENSE_NODES_ID);
    let lats = collect_varints(&dense, DENSE_NODES_LAT);
    let lons = collect_varints(&dense, DENSE_NODES_LON);

    if ids.len() != lats.len() || ids.len() != lons.len() {
        return Err(Error::malformed(format!(
            "DenseNodes id/lat/lon packed arrays differ in length: {}/{}/{}",
            ids.len(),
            lats.len(),
            lons.len()
        )));
    }

    let mut id = 0i64;
    let mut lat = 0i64;
    let mut lon = 0i64;
    for i in 0..ids.len() {
        id += zigzag_decode(ids[i]);
        lat += zigzag_decode(lats[i]);
        lon += zigzag_decode(lons[i]);
        map.nodes.push(Node {
            id,
            lat: lat * DEFAULT_GRANULARITY_TO_NANODEGREES,
            lon: lon * DEFAULT_GRANULARITY_TO_NANODEGREES,
            tags: Vec::new(),
        });
    }

    Ok(())
}

fn collect_varints(msg: &Message, number: u32) -> Vec<u64> {
    let mut out = Vec::new();
    let mut cursor = None;
    loop {
        cursor = msg.next_field(
            cursor,
            number,
            ExpectedType::Type(WireType::Varint),
            crate::wire::Direction::Forward,
        );
        match cursor {
            Some(c) => out.push(msg.field_at(c).value.as_varint().unwrap()),
            None => break,
        }
    }
    out
}

/// Decodes a single Way sub-message: required `id`, packed `keys`/`vals`
/// (resolved through the block-local StringTable, copied into the `Way` so
/// it outlives the table), and packed zigzag+delta `refs`.
fn decode_way(way_msg: &Message, strings: &[String]) -> Result<Way> {
    let id = way_msg
        .get_field(WAY_ID, ExpectedType::Type(WireType::Varint))
        .map(|c| way_msg.field_at(c).value.as_varint().unwrap() as i64)
        .ok_or_else(|| Error::malformed("Way missing required field `id`"))?;

    let mut way_msg = way_msg.clone();
    way_msg.expand_packed(WAY_KEYS, PACKED_VARINT)?;
    way_msg.expand_packed(WAY_VALS, PACKED_VARINT)?;
    way_msg.expand_packed(WAY_REFS, PACKED_VARINT)?;

    let keys = collect_varints(&way_msg, WAY_KEYS);
    let vals = collect_varints(&way_msg, WAY_VALS);
    if keys.len() != vals.len() {
        return Err(Error::malformed(format!(
            "Way {} has mismatched keys/vals lengths: {}/{}",
            id,
            keys.len(),
            vals.len()
        )));
    }
    let tags = keys
        .iter()
        .zip(vals.iter())
        .map(|(&k, &v)| Tag {
            key: resolve_string(strings, k),
            value: resolve_string(strings, v),
        })
        .collect();

    let ref_deltas = collect_varints(&way_msg, WAY_REFS);
    let mut refs = Vec::with_capacity(ref_deltas.len());
    let mut running = 0i64;
    for delta in ref_deltas {
        running += zigzag_decode(delta);
        refs.push(running);
    }

    Ok(Way { id, refs, tags })
}
