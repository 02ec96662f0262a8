//! The hierarchy encoding pass
//!
//! One pass walks the tree depth-first from the structural root,
//! resolves every visited node's effective attribute set through the
//! cascade, derives its border color, and — when the node has visible
//! children — builds a value mapping and hands each child a designated
//! set before recursing. Nodes outside the navigable view window are
//! pruned structurally: above the view root only its own ancestor chain
//! is walked.
//!
//! The pass never fails; missing configuration leaves attributes absent.

use crate::config::{MappingBy, SeriesOptions, StyleOptions};
use crate::mapping::{RangeValues, VisualAttr, VisualMapping};
use crate::style::{calculate_border_color, calculate_color, resolve_visuals, VisualSet};
use crate::tree::{IdIndexMap, TreemapTree};

/// Recompute `visuals.color` and `visuals.border_color` for every node
/// reachable in the current view window.
///
/// `view_root` is the top of the navigable sub-hierarchy; the walk still
/// starts at the structural root so that level defaults (indexed by true
/// depth) and parent-to-child designation stay correct at any drill
/// depth. A removed root skips the pass entirely.
pub fn reset_visuals(
    tree: &mut TreemapTree,
    view_root: usize,
    series: &SeriesOptions,
    id_index: &mut IdIndexMap,
) {
    if tree.is_empty() {
        return;
    }
    let root = tree.root();
    if tree.node(root).removed {
        return;
    }

    let view_root_chain = tree.ancestors(view_root, true);
    travel_tree(
        tree,
        root,
        VisualSet::default(),
        series,
        &view_root_chain,
        id_index,
    );
}

fn travel_tree(
    tree: &mut TreemapTree,
    idx: usize,
    designated: VisualSet,
    series: &SeriesOptions,
    view_root_chain: &[usize],
    id_index: &mut IdIndexMap,
) {
    {
        let node = tree.node(idx);
        if node.removed {
            return;
        }
        match &node.layout {
            Some(layout) if !layout.invisible && layout.is_in_view => {}
            _ => return,
        }
    }

    let depth = tree.node(idx).depth;
    let visuals = {
        let node = tree.node(idx);
        resolve_visuals(
            &node.options.item_style,
            series.level(depth).map(|l| &l.item_style),
            &designated,
            &series.defaults.item_style,
        )
    };

    // Border derivation forces the node color computation even for
    // parents that would not otherwise need it.
    let border_color = {
        let node = tree.node(idx);
        let border_saturation = series
            .lookup(&node.options, depth, |o| {
                o.item_style.border_color_saturation.as_ref()
            })
            .copied();
        match border_saturation {
            Some(saturation) => calculate_border_color(saturation, calculate_color(&visuals)),
            None => series
                .lookup_style(&node.options, depth, |o| &o.item_style.border_color)
                .value()
                .copied(),
        }
    };
    tree.node_mut(idx).visuals.border_color = border_color;

    let view_children = tree.node(idx).view_children.clone();
    if view_children.is_empty() {
        // A leaf for encoding purposes, even with non-visible children.
        tree.node_mut(idx).visuals.color = calculate_color(&visuals);
        return;
    }

    let mapping = build_mapping(tree, idx, series, &visuals);

    for (child_index, &child) in view_children.iter().enumerate() {
        // Above the view root, only the ancestor leading to it is
        // traversed; its siblings get no visuals this pass.
        let child_depth = tree.node(child).depth;
        if child_depth < view_root_chain.len() && view_root_chain[child_depth] != child {
            continue;
        }

        let child_visual = designate_child(
            tree,
            idx,
            child,
            child_index,
            &visuals,
            mapping.as_ref(),
            series,
            id_index,
        );
        travel_tree(tree, child, child_visual, series, view_root_chain, id_index);
    }
}

/// Build the value mapping for a parent's children, if it qualifies.
///
/// A mapping exists when a color range is configured, or when the
/// resolved color is usable and an alpha or saturation range is
/// configured. Empty ranges never qualify.
fn build_mapping(
    tree: &TreemapTree,
    idx: usize,
    series: &SeriesOptions,
    visuals: &VisualSet,
) -> Option<VisualMapping> {
    let node = tree.node(idx);
    let layout = node.layout.as_ref()?;
    let depth = node.depth;

    let range = range_visual(series, &node.options, depth, VisualAttr::Color).or_else(|| {
        if visuals.color.value().is_none() {
            return None;
        }
        range_visual(series, &node.options, depth, VisualAttr::ColorAlpha)
            .or_else(|| range_visual(series, &node.options, depth, VisualAttr::ColorSaturation))
    });
    let (attribute, range) = range?;

    // visualMin/visualMax only widen the natural children extent.
    let mut extent = layout.data_extent;
    if let Some(&min) = series.lookup(&node.options, depth, |o| o.visual_min.as_ref()) {
        if min < extent[0] {
            extent[0] = min;
        }
    }
    if let Some(&max) = series.lookup(&node.options, depth, |o| o.visual_max.as_ref()) {
        if max > extent[1] {
            extent[1] = max;
        }
    }

    let mapping_by = series
        .lookup(&node.options, depth, |o| o.color_mapping_by.as_ref())
        .copied()
        .unwrap_or_default();

    Some(VisualMapping::new(attribute, extent, range, mapping_by))
}

fn range_visual(
    series: &SeriesOptions,
    own: &StyleOptions,
    depth: usize,
    attribute: VisualAttr,
) -> Option<(VisualAttr, RangeValues)> {
    let range = match attribute {
        VisualAttr::Color => series
            .lookup(own, depth, |o| o.color_range.as_deref())
            .map(|r| RangeValues::Colors(r.to_vec())),
        VisualAttr::ColorAlpha => series
            .lookup(own, depth, |o| o.color_alpha_range.as_deref())
            .map(|r| RangeValues::Numbers(r.to_vec())),
        VisualAttr::ColorSaturation => series
            .lookup(own, depth, |o| o.color_saturation_range.as_deref())
            .map(|r| RangeValues::Numbers(r.to_vec())),
    };
    range
        .filter(|r| !r.is_empty())
        .map(|r| (attribute, r))
}

/// Compute the designated set handed to one child.
///
/// Without a mapping the child inherits the parent's effective set
/// unchanged; with one, the mapped attribute is overridden from the
/// child's mapping input (ordinal, id-derived ordinal, or value along
/// the visual dimension).
#[allow(clippy::too_many_arguments)]
fn designate_child(
    tree: &TreemapTree,
    parent: usize,
    child: usize,
    child_index: usize,
    visuals: &VisualSet,
    mapping: Option<&VisualMapping>,
    series: &SeriesOptions,
    id_index: &mut IdIndexMap,
) -> VisualSet {
    let mut child_visuals = visuals.clone();

    if let Some(mapping) = mapping {
        // index/id sources only apply to color mappings; alpha and
        // saturation always map by value.
        let source = if mapping.attribute == VisualAttr::Color {
            mapping.mapping_by
        } else {
            MappingBy::Value
        };
        let input = match source {
            MappingBy::Index => child_index as f64,
            MappingBy::Id => id_index.map_id_to_index(&tree.node(child).id) as f64,
            MappingBy::Value => {
                let parent_node = tree.node(parent);
                let dimension = series
                    .lookup(&parent_node.options, parent_node.depth, |o| {
                        o.visual_dimension.as_ref()
                    })
                    .copied()
                    .unwrap_or(0);
                tree.node(child).value_along(dimension)
            }
        };
        mapping.apply(&mut child_visuals, input);
    }

    child_visuals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{interpolate_stops, Rgba};

    fn opts(json: &str) -> StyleOptions {
        serde_json::from_str(json).unwrap()
    }

    fn series(json: &str) -> SeriesOptions {
        SeriesOptions::from_json(json).unwrap()
    }

    fn run(tree: &mut TreemapTree, view_root: usize, series: &SeriesOptions) {
        let mut ids = IdIndexMap::new();
        reset_visuals(tree, view_root, series, &mut ids);
    }

    /// Root with a color range over two leaf children, extent [20, 80].
    fn range_tree(root_json: &str) -> (TreemapTree, usize, usize) {
        let mut tree = TreemapTree::with_root("root", vec![100.0], opts(root_json));
        let a = tree.add_child(0, "a", vec![20.0], StyleOptions::default());
        let b = tree.add_child(0, "b", vec![80.0], StyleOptions::default());
        tree.node_mut(0).layout.as_mut().unwrap().data_extent = [20.0, 80.0];
        (tree, a, b)
    }

    #[test]
    fn test_linear_range_designates_children() {
        let (mut tree, a, b) =
            range_tree(r##"{"colorRange": ["#000000", "#c8c8c8"]}"##);
        run(&mut tree, 0, &SeriesOptions::default());

        // Leaves take their designated color: domain min → first stop,
        // max → last stop.
        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(tree.node(b).visuals.color, Some(Rgba::rgb(200, 200, 200)));
    }

    #[test]
    fn test_own_color_beats_designated() {
        let (mut tree, a, b) = range_tree(r##"{"colorRange": ["#0000ff", "#0000ff"]}"##);
        tree.node_mut(a).options = opts(r##"{"itemStyle": {"color": "#ff0000"}}"##);
        run(&mut tree, 0, &SeriesOptions::default());

        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(tree.node(b).visuals.color, Some(Rgba::rgb(0, 0, 255)));
    }

    #[test]
    fn test_index_mapping_cycles_over_range() {
        let mut tree = TreemapTree::with_root(
            "root",
            vec![4.0],
            opts(r##"{"colorRange": ["#ff0000", "#00ff00", "#0000ff"], "colorMappingBy": "index"}"##),
        );
        let kids: Vec<usize> = (0..4)
            .map(|i| tree.add_child(0, format!("k{}", i), vec![1.0], StyleOptions::default()))
            .collect();
        run(&mut tree, 0, &SeriesOptions::default());

        let expected = [
            Rgba::rgb(255, 0, 0),
            Rgba::rgb(0, 255, 0),
            Rgba::rgb(0, 0, 255),
            Rgba::rgb(255, 0, 0),
        ];
        for (kid, want) in kids.iter().zip(expected) {
            assert_eq!(tree.node(*kid).visuals.color, Some(want));
        }
    }

    #[test]
    fn test_id_mapping_uses_stable_ordinals() {
        let mut tree = TreemapTree::with_root(
            "root",
            vec![2.0],
            opts(r##"{"colorRange": ["#ff0000", "#00ff00"], "colorMappingBy": "id"}"##),
        );
        let x = tree.add_child(0, "x", vec![1.0], StyleOptions::default());
        let y = tree.add_child(0, "y", vec![1.0], StyleOptions::default());

        let mut ids = IdIndexMap::new();
        // Pre-seed "y" so its ordinal differs from its sibling position.
        ids.map_id_to_index("y");
        reset_visuals(&mut tree, 0, &SeriesOptions::default(), &mut ids);

        assert_eq!(tree.node(y).visuals.color, Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(tree.node(x).visuals.color, Some(Rgba::rgb(0, 255, 0)));
    }

    #[test]
    fn test_alpha_range_requires_usable_color() {
        // No color anywhere: the alpha range alone builds no mapping.
        let (mut tree, a, _) = range_tree(r##"{"colorAlphaRange": [0.2, 1.0]}"##);
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(tree.node(a).visuals.color, None);

        // With a series color, the alpha range maps per child value.
        let (mut tree, a, b) = range_tree(r##"{"colorAlphaRange": [0.2, 1.0]}"##);
        let s = series(r##"{"itemStyle": {"color": "#336699"}}"##);
        run(&mut tree, 0, &s);
        let base = Rgba::rgb(0x33, 0x66, 0x99);
        assert_eq!(tree.node(a).visuals.color, Some(base.with_alpha(0.2)));
        assert_eq!(tree.node(b).visuals.color, Some(base.with_alpha(1.0)));
    }

    #[test]
    fn test_suppressed_color_disables_alpha_range() {
        let (mut tree, a, _) = range_tree(
            r##"{"itemStyle": {"color": "none"}, "colorAlphaRange": [0.2, 1.0]}"##,
        );
        // The level/series color must not resurrect the mapping either.
        let s = series(r##"{"itemStyle": {"color": "#336699"}}"##);
        run(&mut tree, 0, &s);
        // Children inherit the parent's effective set unchanged; the
        // suppressed color stops the chain, so leaves stay uncolored.
        assert_eq!(tree.node(a).visuals.color, None);
    }

    #[test]
    fn test_empty_range_is_a_no_op() {
        let (mut tree, a, b) = range_tree(r##"{"colorRange": []}"##);
        let s = series(r##"{"itemStyle": {"color": "#336699"}}"##);
        run(&mut tree, 0, &s);
        // No mapping: both leaves resolve the plain series color.
        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(0x33, 0x66, 0x99)));
        assert_eq!(tree.node(a).visuals.color, tree.node(b).visuals.color);
    }

    #[test]
    fn test_domain_widening_is_one_directional() {
        // visualMin below the natural minimum widens the domain.
        let (tree, ..) = range_tree(
            r##"{"colorRange": ["#000000", "#ffffff"], "visualMin": 0.0, "visualMax": 50.0}"##,
        );
        let visuals = VisualSet::default();
        let m = build_mapping(&tree, 0, &SeriesOptions::default(), &visuals).unwrap();
        // Min widened to 0; max 50 is below the natural 80 and ignored.
        assert_eq!(m.domain, [0.0, 80.0]);

        // The other direction: min above natural ignored, max widened.
        let (tree, ..) = range_tree(
            r##"{"colorRange": ["#000000", "#ffffff"], "visualMin": 40.0, "visualMax": 100.0}"##,
        );
        let m = build_mapping(&tree, 0, &SeriesOptions::default(), &visuals).unwrap();
        assert_eq!(m.domain, [20.0, 100.0]);
    }

    #[test]
    fn test_level_defaults_indexed_by_true_depth() {
        let (mut tree, a, _) = range_tree("{}");
        let s = series(
            r##"{"levels": [{}, {"itemStyle": {"color": "#00ff00"}}]}"##,
        );
        run(&mut tree, 0, &s);
        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(0, 255, 0)));
    }

    #[test]
    fn test_border_color_from_own_resolved_color() {
        let mut tree = TreemapTree::with_root(
            "root",
            vec![10.0],
            opts(r##"{"itemStyle": {"color": "#884400"}}"##),
        );
        let a = tree.add_child(
            0,
            "a",
            vec![10.0],
            opts(r##"{"itemStyle": {"color": "#336699", "borderColorSaturation": 0.2}}"##),
        );
        run(&mut tree, 0, &SeriesOptions::default());

        // Derived from this node's resolved color, not the parent's.
        assert_eq!(
            tree.node(a).visuals.border_color,
            Some(Rgba::rgb(0x33, 0x66, 0x99).with_saturation(0.2))
        );
        // Without borderColorSaturation the literal border (absent here)
        // applies.
        assert_eq!(tree.node(0).visuals.border_color, None);
    }

    #[test]
    fn test_literal_border_color() {
        let mut tree = TreemapTree::with_root(
            "root",
            vec![1.0],
            opts(r##"{"itemStyle": {"borderColor": "#123456"}}"##),
        );
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(
            tree.node(0).visuals.border_color,
            Some(Rgba::rgb(0x12, 0x34, 0x56))
        );
    }

    #[test]
    fn test_removed_root_skips_pass() {
        let (mut tree, a, _) = range_tree(r##"{"colorRange": ["#ff0000", "#ff0000"]}"##);
        tree.node_mut(0).removed = true;
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(tree.node(a).visuals.color, None);
        assert_eq!(tree.node(0).visuals.border_color, None);
    }

    #[test]
    fn test_invisible_node_skipped() {
        let (mut tree, a, b) = range_tree(r##"{"colorRange": ["#ff0000", "#ff0000"]}"##);
        tree.node_mut(a).layout.as_mut().unwrap().invisible = true;
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(tree.node(a).visuals.color, None);
        assert_eq!(tree.node(a).visuals.border_color, None);
        // The sibling is still encoded.
        assert_eq!(tree.node(b).visuals.color, Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn test_out_of_view_node_skipped() {
        let (mut tree, a, b) = range_tree(r##"{"colorRange": ["#ff0000", "#ff0000"]}"##);
        tree.node_mut(b).layout.as_mut().unwrap().is_in_view = false;
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(tree.node(b).visuals.color, None);
        assert_eq!(tree.node(b).visuals.border_color, None);
        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn test_layoutless_node_skipped() {
        let (mut tree, a, b) = range_tree(r##"{"colorRange": ["#ff0000", "#ff0000"]}"##);
        tree.node_mut(b).layout = None;
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(tree.node(b).visuals.color, None);
        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn test_removed_interior_node_skips_subtree() {
        let (mut tree, a, b) = range_tree(r##"{"colorRange": ["#ff0000", "#ff0000"]}"##);
        let a1 = tree.add_child(a, "a1", vec![20.0], StyleOptions::default());
        tree.node_mut(a).removed = true;
        run(&mut tree, 0, &SeriesOptions::default());
        // Neither the removed node nor its subtree gets visuals.
        assert_eq!(tree.node(a).visuals.color, None);
        assert_eq!(tree.node(a).visuals.border_color, None);
        assert_eq!(tree.node(a1).visuals.color, None);
        assert_eq!(tree.node(b).visuals.color, Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn test_view_window_prunes_to_ancestor_chain() {
        // root ── a ── a1, a2
        //      └─ b ── b1
        let mut tree = TreemapTree::with_root("root", vec![10.0], StyleOptions::default());
        let a = tree.add_child(0, "a", vec![6.0], StyleOptions::default());
        let b = tree.add_child(0, "b", vec![4.0], StyleOptions::default());
        let a1 = tree.add_child(a, "a1", vec![3.0], StyleOptions::default());
        let a2 = tree.add_child(a, "a2", vec![3.0], StyleOptions::default());
        let b1 = tree.add_child(b, "b1", vec![4.0], StyleOptions::default());

        let s = series(r##"{"itemStyle": {"color": "#336699"}}"##);
        // Drill into `a`: traversal starts at the root but only the
        // chain to `a` and its subtree receive visuals.
        run(&mut tree, a, &s);

        let painted = Rgba::rgb(0x33, 0x66, 0x99);
        assert_eq!(tree.node(a1).visuals.color, Some(painted));
        assert_eq!(tree.node(a2).visuals.color, Some(painted));
        // Siblings of the view root's chain are untouched.
        assert_eq!(tree.node(b).visuals.color, None);
        assert_eq!(tree.node(b).visuals.border_color, None);
        assert_eq!(tree.node(b1).visuals.color, None);
    }

    #[test]
    fn test_view_window_cascade_uses_true_depth() {
        // Level styles must apply by structural depth even when drilled
        // into a deep node.
        let mut tree = TreemapTree::with_root("root", vec![10.0], StyleOptions::default());
        let a = tree.add_child(0, "a", vec![10.0], StyleOptions::default());
        let a1 = tree.add_child(a, "a1", vec![10.0], StyleOptions::default());
        let s = series(
            r##"{"levels": [{}, {}, {"itemStyle": {"color": "#ff00ff"}}]}"##,
        );
        run(&mut tree, a1, &s);
        assert_eq!(tree.node(a1).visuals.color, Some(Rgba::rgb(255, 0, 255)));
    }

    #[test]
    fn test_visual_dimension_selects_value_component() {
        let mut tree = TreemapTree::with_root(
            "root",
            vec![2.0, 0.0],
            opts(r##"{"colorRange": ["#000000", "#c8c8c8"], "visualDimension": 1}"##),
        );
        let a = tree.add_child(0, "a", vec![1.0, 0.0], StyleOptions::default());
        let b = tree.add_child(0, "b", vec![1.0, 10.0], StyleOptions::default());
        tree.node_mut(0).layout.as_mut().unwrap().data_extent = [0.0, 10.0];
        run(&mut tree, 0, &SeriesOptions::default());

        assert_eq!(tree.node(a).visuals.color, Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(tree.node(b).visuals.color, Some(Rgba::rgb(200, 200, 200)));
    }

    #[test]
    fn test_multi_stop_interpolation_matches_stops() {
        let stops = [
            Rgba::rgb(0, 0, 0),
            Rgba::rgb(100, 100, 100),
            Rgba::rgb(200, 200, 200),
        ];
        let (mut tree, _, _) = range_tree(
            r##"{"colorRange": ["#000000", "#646464", "#c8c8c8"]}"##,
        );
        let mid = tree.add_child(0, "mid", vec![50.0], StyleOptions::default());
        run(&mut tree, 0, &SeriesOptions::default());
        assert_eq!(
            tree.node(mid).visuals.color,
            Some(interpolate_stops(&stops, 0.5))
        );
    }

    #[test]
    fn test_designated_set_inherits_unmapped_attributes() {
        // Saturation designated by the parent cascade flows through a
        // color mapping untouched.
        let (mut tree, a, _) = range_tree(
            r##"{"colorRange": ["#ff0000", "#ff0000"]}"##,
        );
        let s = series(r##"{"itemStyle": {"colorSaturation": 0.3}}"##);
        run(&mut tree, 0, &s);
        assert_eq!(
            tree.node(a).visuals.color,
            Some(Rgba::rgb(255, 0, 0).with_saturation(0.3))
        );
    }
}
