// Hierarchy building, point counting and boundary refresh on the fixture library
use layout_trace::hierarchy::{LibrarySource, HIERARCHY_LIMIT};
use layout_trace::{LayerTable, Library, Point};

fn load() -> (Library, LayerTable) {
    let layers = LayerTable::from_json_file("tests/fixtures/layers.json").expect("Failed to load layers");
    let library = LibrarySource::from_json_file("tests/fixtures/finger_bus.json")
        .expect("Failed to load library")
        .build(&layers)
        .expect("Failed to build library");
    (library, layers)
}

#[test]
fn test_resolution_and_top_cell() {
    let (library, _) = load();
    assert_eq!(library.len(), 4);

    let top = library.top();
    assert_eq!(library.cell(top).name(), "top");
    // The reference to an unknown cell was dropped
    assert_eq!(library.cell(top).references().len(), 2);

    let row = library.find("bus_row").unwrap();
    assert_eq!(library.cell(row).references().len(), 4);

    let via = library.find("via_contact__3").unwrap();
    assert!(library.cell(via).is_pcell());
    assert!(!library.cell(top).is_pcell());
}

#[test]
fn test_point_counts() {
    let (mut library, _) = load();
    let total = library.count_total_points(library.top());
    assert_eq!(total, 96);
    assert!(total < HIERARCHY_LIMIT);

    let finger = library.find("finger").unwrap();
    assert_eq!(library.cell(finger).accumulated_points(), 16);
    let row = library.find("bus_row").unwrap();
    assert_eq!(library.cell(row).accumulated_points(), 64);

    // Counting twice gives the same answer
    assert_eq!(library.count_total_points(library.top()), 96);
}

#[test]
fn test_boundaries_follow_visibility() {
    let (mut library, mut layers) = load();
    let top = library.top();

    let bbox = library.boundary(top);
    assert_eq!(bbox.min, Point::new(0.0, 0.0));
    assert_eq!(bbox.max, Point::new(21.0, 11.0));

    let poly = layers.by_name("poly").unwrap();
    layers.set_shown(poly, false);
    library.refresh_boundaries(&layers);

    let bbox = library.boundary(top);
    assert_eq!(bbox.max, Point::new(21.0, 4.0));
}

#[test]
fn test_prepare_triangulations() {
    let (library, _) = load();
    library.prepare_triangulations();
    for (_, cell) in library.cells() {
        assert!(cell.polygons().iter().all(|p| p.is_triangulated()));
    }
    library.log_hierarchy();
}

#[test]
fn test_topological_order_covers_reachable_cells() {
    let (library, _) = load();
    let order = library.topological_order(library.top());
    assert_eq!(order.len(), 4);
    assert_eq!(*order.last().unwrap(), library.top());

    let pos = |name: &str| {
        let id = library.find(name).unwrap();
        order.iter().position(|&c| c == id).unwrap()
    };
    assert!(pos("via_contact__3") < pos("finger"));
    assert!(pos("finger") < pos("bus_row"));
}
