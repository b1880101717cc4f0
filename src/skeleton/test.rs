use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use super::*;
use super::edge_event::collapse_time;
use crate::contour;
use crate::geo::{Contour, Polygon};

fn edge(start:[f64;2], end:[f64;2]) -> ContourEdge {
    ContourEdge::new(Point2::new(start[0], start[1]), Point2::new(end[0], end[1]))
}
fn polygon(outer:Result<Contour, crate::geo::GeometryError>) -> Polygon {
    Polygon::new(outer.unwrap(), Vec::new()).unwrap()
}
fn notched_rectangle() -> Polygon {
    polygon(contour!([0.,0.],[10.,0.],[10.,4.],[6.,4.],[5.,1.],[4.,4.],[0.,4.]))
}

#[test]
fn contour_edge_offset_lines(){
    let bottom = edge([0.,0.], [4.,0.]);
    assert_eq!(bottom.normal, Vector2::new(0.,1.));
    assert_eq!(bottom.distance(&Point2::new(2.,3.), 0.0), 3.0);
    assert_eq!(bottom.distance(&Point2::new(2.,3.), 1.0), 2.0);
    assert_eq!(bottom.distance(&Point2::new(2.,-1.), 0.0), -1.0);
}
#[test]
fn bisector_test(){
    let left = edge([0.,4.], [0.,0.]);
    let right = edge([0.,0.], [4.,0.]);
    assert_eq!(Vector2::new(1.,1.), bisector(&left, &right).unwrap());
}
#[test]
fn bisector_test_acute_angle(){
    let left = edge([-1.,1.], [0.,0.]);
    let right = edge([0.,0.], [1.,1.]);
    let correct_bisector = Vector2::new(0.,2.0_f64.sqrt());
    assert_relative_eq!(correct_bisector, bisector(&left, &right).unwrap(), epsilon = 1e-12);
}
#[test]
fn bisector_test_reflex_angle(){
    let left = edge([4.,2.], [2.,2.]);
    let right = edge([2.,2.], [2.,4.]);
    assert_eq!(Vector2::new(-1.,-1.), bisector(&left, &right).unwrap());
    assert!(is_reflex(&left, &right));
    assert!(!is_reflex(&right, &left));
}
#[test]
fn bisector_test_parallel_edges(){
    let left = edge([0.,0.], [1.,0.]);
    let right = edge([1.,0.], [3.,0.]);
    assert_eq!(Vector2::new(0.,1.), bisector(&left, &right).unwrap());
    assert!(!is_reflex(&left, &right));

    let back = edge([1.,0.], [0.,0.]);
    assert_eq!(Vector2::zeros(), bisector(&left, &back).unwrap());
    assert!(!is_reflex(&left, &back));
}
#[test]
fn collapse_time_test(){
    let t = collapse_time(
        &Point2::new(0.,0.), &Vector2::new(1.,1.),
        &Point2::new(4.,0.), &Vector2::new(-1.,1.),
        1e-9);
    assert_eq!(t, Some(2.0));
    // diverging
    let t = collapse_time(
        &Point2::new(0.,0.), &Vector2::new(-1.,1.),
        &Point2::new(4.,0.), &Vector2::new(1.,1.),
        1e-9);
    assert_eq!(t, None);
    // same velocity
    let v = Vector2::new(0.,1.);
    assert_eq!(collapse_time(&Point2::new(0.,0.), &v, &Point2::new(1.,0.), &v, 1e-9), None);
    assert_eq!(collapse_time(&Point2::new(0.,0.), &v, &Point2::new(0.,0.), &v, 1e-9), Some(0.0));
    // crossing paths that never meet
    let t = collapse_time(
        &Point2::new(0.,0.), &Vector2::new(1.,0.),
        &Point2::new(2.,-1.), &Vector2::new(0.,2.),
        1e-9);
    assert_eq!(t, None);
}

fn triangle_nodes() -> Nodes {
    let mut nodes = Nodes::default();
    for i in 0..3 {
        nodes.insert(Node::new(i, (i + 2) % 3, i, Vector2::zeros(), false).with_links((i + 2) % 3, (i + 1) % 3));
    }
    nodes
}
#[test]
fn nodes_forwards_iterator_test(){
    let nodes = triangle_nodes();
    let forward_iter: Vec<usize> = nodes.iter_from(0).map(|n| n.ndx).collect();
    assert_eq!(vec![0,1,2], forward_iter);
    assert_eq!(nodes.cycle_len(1), 3);
}
#[test]
fn nodes_backwards_iterator_test(){
    let nodes = triangle_nodes();
    let backwards_iter: Vec<usize> = nodes.back_iter_from(0).map(|n| n.ndx).collect();
    assert_eq!(vec![0,2,1], backwards_iter);
}
#[test]
fn nodes_merge_test(){
    let mut nodes = triangle_nodes();
    let merged = nodes.merge(&[1,2], Node::new(3, 0, 2, Vector2::zeros(), false));
    assert_eq!(merged, 3);
    assert_eq!(nodes.len(), 2);
    assert!(!nodes.contains(1) && !nodes.contains(2));
    assert_eq!(nodes.next(0).ndx, 3);
    assert_eq!(nodes.prev(0).ndx, 3);
    assert_eq!(nodes.cycle_len(0), 2);
}
#[test]
fn nodes_track_active_edges(){
    let mut nodes = triangle_nodes();
    assert!((0..3).all(|edge| nodes.edge_is_active(edge)));
    assert!(!nodes.edge_is_active(3));

    let merged = nodes.merge(&[1,2], Node::new(3, 0, 2, Vector2::zeros(), false));
    assert!(!nodes.edge_is_active(1));
    assert!(nodes.edge_is_active(2));
    nodes.deactivate(merged);
    nodes.deactivate(merged);
    assert!(!nodes.edge_is_active(2));
    assert!(nodes.edge_is_active(0));
}
#[test]
fn nodes_split_test(){
    // square 0-1-2-3, node 0 splits the edge 2-3
    let mut nodes = Nodes::default();
    for i in 0..4 {
        nodes.insert(Node::new(i, (i + 3) % 4, i, Vector2::zeros(), false).with_links((i + 3) % 4, (i + 1) % 4));
    }
    let left = Node::new(4, 3, 2, Vector2::zeros(), false).with_links(3, 3);
    let right = Node::new(4, 2, 0, Vector2::zeros(), false).with_links(2, 1);
    let [left_ndx, right_ndx] = nodes.split(0, left, right);
    assert!(!nodes.contains(0));
    let left_loop: Vec<usize> = nodes.iter_from(left_ndx).map(|n| n.ndx).collect();
    let right_loop: Vec<usize> = nodes.iter_from(right_ndx).map(|n| n.ndx).collect();
    assert_eq!(left_loop, vec![4, 3]);
    assert_eq!(right_loop, vec![5, 1, 2]);
}

#[test]
fn square_collapses_in_one_event(){
    let square = polygon(contour!([0.,0.],[4.,0.],[4.,4.],[0.,4.]));
    let mut builder = SkeletonBuilder::from_polygon(&square, &Settings::default()).unwrap();
    assert_eq!(builder.state(), BuilderState::Active);
    match builder.advance().unwrap() {
        Advance::Fired(event) => {
            assert_eq!(event.kind, EventKind::Edge);
            assert_eq!(event.time, 2.0);
            assert_eq!(event.point, Point2::new(2.,2.));
            assert_eq!(event.vertex_ndx, 4);
        },
        Advance::QueueEmpty => panic!("expected an event"),
    }
    assert_eq!(builder.active_nodes(), 0);
    assert_eq!(builder.advance().unwrap(), Advance::QueueEmpty);
    assert_eq!(builder.state(), BuilderState::Finished);
    assert_eq!(builder.advance().unwrap(), Advance::QueueEmpty);
}
#[test]
fn rectangle_events_happen_at_half_width(){
    let rectangle = polygon(contour!([0.,0.],[4.,0.],[4.,2.],[0.,2.]));
    let mut builder = SkeletonBuilder::from_polygon(&rectangle, &Settings::default()).unwrap();
    let mut points = Vec::new();
    while let Advance::Fired(event) = builder.advance().unwrap() {
        assert_eq!(event.kind, EventKind::Edge);
        assert_eq!(event.time, 1.0);
        points.push(event.point);
    }
    assert_eq!(points, vec![Point2::new(3.,1.), Point2::new(1.,1.)]);
    assert_eq!(builder.time(), 1.0);
}
#[test]
fn reflex_node_finds_split_candidates(){
    let builder = SkeletonBuilder::from_polygon(&notched_rectangle(), &Settings::default()).unwrap();
    let node = builder.shrinking_polygon.nodes[4];
    assert!(node.reflex);
    assert_relative_eq!(node.bisector, Vector2::new(0., -10.0_f64.sqrt()), epsilon = 1e-12);
    let events = builder.compute_split_events(&node);
    let bottom = events.iter()
        .find(|event| matches!(event.event_type, EventType::Split{edge:0,..}))
        .unwrap();
    assert_relative_eq!(bottom.time.0, 1.0/(1.0 + 10.0_f64.sqrt()), epsilon = 1e-12);
    // convex nodes never split
    assert!(builder.compute_split_events(&builder.shrinking_polygon.nodes[0]).is_empty());
}
#[test]
fn notch_splits_before_any_edge_event(){
    let mut builder = SkeletonBuilder::from_polygon(&notched_rectangle(), &Settings::default()).unwrap();
    let Advance::Fired(event) = builder.advance().unwrap() else { panic!("expected an event") };
    assert_eq!(event.kind, EventKind::Split);
    let t = 1.0/(1.0 + 10.0_f64.sqrt());
    assert_relative_eq!(event.time, t, epsilon = 1e-12);
    assert_relative_eq!(event.point, Point2::new(5., t), epsilon = 1e-12);
    // the wavefront now forms two loops of four nodes
    let loops: Vec<usize> = builder.shrinking_polygon.active_nodes_iter()
        .map(|ndx| builder.shrinking_polygon.cycle_len(ndx))
        .collect();
    assert_eq!(loops, vec![4; 8]);
}
#[test]
fn flat_cycle_closes_without_waiting_for_the_queue(){
    let t_shape = polygon(contour!([2.,4.],[2.,0.],[4.,0.],[4.,4.],[6.,4.],[6.,6.],[0.,6.],[0.,4.]));
    let mut builder = SkeletonBuilder::from_polygon(&t_shape, &Settings::default()).unwrap();
    let mut kinds = Vec::new();
    while let Advance::Fired(event) = builder.advance().unwrap() {
        assert_relative_eq!(event.time, 1.0, epsilon = 1e-9);
        kinds.push(event.kind);
    }
    let (edge, split) = (EventKind::Edge, EventKind::Split);
    assert_eq!(kinds, vec![edge, edge, edge, split, edge]);
    assert_eq!(builder.state(), BuilderState::Finished);
    assert_eq!(builder.active_nodes(), 0);
}
#[test]
fn collapsed_cycle_gets_vertices_where_its_nodes_stopped(){
    let mut builder = SkeletonBuilder::from_polygon(&notched_rectangle(), &Settings::default()).unwrap();
    // a cycle lying on y = 1 with one node still moving along it
    let a = builder.add_vertex(Point2::new(0., 1.), 1.0);
    let b = builder.add_vertex(Point2::new(2., 1.), 0.5);
    let c = builder.add_vertex(Point2::new(4., 1.), 1.0);
    let mut nodes = Nodes::default();
    nodes.insert(Node::new(a, 0, 1, Vector2::zeros(), false).with_links(2, 1));
    nodes.insert(Node::new(b, 1, 2, Vector2::new(-2., 0.), false).with_links(0, 2));
    nodes.insert(Node::new(c, 2, 0, Vector2::zeros(), false).with_links(1, 0));
    builder.shrinking_polygon = nodes;
    let edges = builder.edges.len();
    let vertices = builder.vertices.len();

    assert!(builder.close_flat_cycle(1, 1.0));
    assert_eq!(builder.active_nodes(), 0);
    assert_eq!(builder.vertices.len(), vertices + 1);
    assert_eq!(builder.vertices[vertices].coords, Point2::new(1., 1.));
    assert_eq!(builder.edge_events, 1);
    let new_edges: Vec<Edge> = builder.edges[edges..].to_vec();
    assert_eq!(new_edges, vec![
        Edge{start:b, end:vertices},
        Edge{start:a, end:vertices},
        Edge{start:vertices, end:c},
    ]);
}
#[test]
fn cycle_with_area_stays_open(){
    let mut builder = SkeletonBuilder::from_polygon(&notched_rectangle(), &Settings::default()).unwrap();
    let active = builder.active_nodes();
    assert!(!builder.close_flat_cycle(0, 0.0));
    assert!(!builder.close_if_collapsed(0, 0.0));
    assert_eq!(builder.active_nodes(), active);
}
#[test]
fn event_limit_fails_the_builder(){
    let square = polygon(contour!([0.,0.],[4.,0.],[4.,4.],[0.,4.]));
    let settings = Settings{ max_events: Some(0), ..Default::default() };
    let mut builder = SkeletonBuilder::from_polygon(&square, &settings).unwrap();
    assert!(matches!(builder.advance(), Err(SkeletonError::ConstructionError{..})));
    assert_eq!(builder.state(), BuilderState::Failed);
    assert!(matches!(builder.advance(), Err(SkeletonError::ConstructionError{..})));
    assert!(builder.compute_skeleton().is_err());
}
#[test]
fn unfinished_builder_has_no_skeleton(){
    let square = polygon(contour!([0.,0.],[4.,0.],[4.,4.],[0.,4.]));
    let builder = SkeletonBuilder::from_polygon(&square, &Settings::default()).unwrap();
    assert!(matches!(StraightSkeleton::try_from(builder), Err(SkeletonError::ConstructionError{..})));
}
#[test]
fn builder_display_lists_nodes_and_vertices(){
    let square = polygon(contour!([0.,0.],[4.,0.],[4.,4.],[0.,4.]));
    let builder = SkeletonBuilder::from_polygon(&square, &Settings::default()).unwrap();
    let table = format!("{builder}");
    assert!(table.contains("Nodes"));
    assert!(table.contains("Vertices"));
    assert_eq!(table.lines().count(), 2 + 4);
}
