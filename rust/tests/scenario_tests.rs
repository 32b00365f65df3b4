use multiway_tree::{BPlusTree, BTree, TreeError, MAX_DEGREE, MIN_DEGREE};

#[test]
fn test_sequential_inserts_split_the_root() {
    let mut btree = BTree::new(2);
    let mut bplus = BPlusTree::new(2);
    for k in 1..=10 {
        btree.insert(k, k);
        bplus.insert(k, k);
    }

    assert!(btree.height() > 1);
    assert!(bplus.height() > 1);
    let expected: Vec<i32> = (1..=10).collect();
    assert_eq!(btree.in_order().map(|(k, _)| *k).collect::<Vec<_>>(), expected);
    assert_eq!(bplus.in_order().map(|(k, _)| *k).collect::<Vec<_>>(), expected);
}

#[test]
fn test_remove_from_small_tree() {
    let mut btree = BTree::new(2);
    let mut bplus = BPlusTree::new(2);
    for k in [5, 3, 7, 1, 9] {
        btree.insert(k, ());
        bplus.insert(k, ());
    }

    assert!(btree.remove(&3));
    assert!(bplus.remove(&3));

    assert!(!btree.contains(&3));
    assert!(!bplus.contains(&3));
    assert_eq!(btree.len(), 4);
    assert_eq!(bplus.len(), 4);
    assert_eq!(btree.keys().copied().collect::<Vec<_>>(), [1, 5, 7, 9]);
    assert_eq!(bplus.keys().copied().collect::<Vec<_>>(), [1, 5, 7, 9]);
}

#[test]
fn test_bplus_inclusive_range() {
    let mut tree = BPlusTree::new(2);
    for k in 1..=20 {
        tree.insert(k, k * 100);
    }
    let found: Vec<_> = tree.range(&5, &10).map(|(k, _)| *k).collect();
    assert_eq!(found, [5, 6, 7, 8, 9, 10]);
}

#[test]
fn test_remove_everything_one_at_a_time() {
    let mut tree = BTree::new(2);
    for k in 1..=10 {
        tree.insert(k, k);
    }

    for (removed, k) in (1..=10).enumerate() {
        let height_before = tree.height();
        assert!(tree.remove(&k));
        assert_eq!(tree.len(), 10 - removed - 1);
        assert!(tree.height() <= height_before);
        tree.check_invariants_detailed().unwrap();
    }

    assert!(tree.is_empty());
    assert_eq!(tree.root_id(), None);
    assert_eq!(tree.height(), 0);
}

#[test]
fn test_zero_degree_is_clamped() {
    assert_eq!(BTree::<i32, i32>::new(0).min_degree(), MIN_DEGREE);
    assert_eq!(BPlusTree::<i32, i32>::new(0).min_degree(), 2);
}

#[test]
fn test_huge_degree_inserts_and_removes() {
    for t in [usize::MAX / 2 + 1, usize::MAX, 1 << 40] {
        let mut btree: BTree<u8, u8> = BTree::new(t);
        let mut bplus: BPlusTree<u8, u8> = BPlusTree::new(t);
        assert!(btree.min_degree() <= MAX_DEGREE);
        assert!(bplus.min_degree() <= MAX_DEGREE);

        for k in 0..100 {
            btree.insert(k, k);
            bplus.insert(k, k);
        }
        assert_eq!(btree.height(), 1);
        assert_eq!(bplus.height(), 1);
        assert!(btree.check_invariants());
        assert!(bplus.check_invariants());

        for k in (0..100).step_by(2) {
            assert!(btree.remove(&k));
            assert!(bplus.remove(&k));
        }
        assert_eq!(btree.len(), 50);
        assert_eq!(bplus.range(&10, &15).map(|(k, _)| *k).collect::<Vec<_>>(), [11, 13, 15]);
        assert!(btree.check_invariants());
        assert!(bplus.check_invariants());
    }
}

#[test]
fn test_empty_tree_behaviour() {
    let mut btree: BTree<i32, i32> = BTree::new(3);
    let mut bplus: BPlusTree<i32, i32> = BPlusTree::new(3);

    assert_eq!(btree.search(&1), None);
    assert_eq!(bplus.search(&1), None);
    assert!(!btree.remove(&1));
    assert!(!bplus.remove(&1));
    assert_eq!(btree.in_order().count(), 0);
    assert_eq!(bplus.in_order().count(), 0);
    assert_eq!(bplus.range(&0, &100).count(), 0);

    assert_eq!(bplus.get_first(), Err(TreeError::EmptyTree));
    assert_eq!(bplus.get_last(), Err(TreeError::EmptyTree));
    assert!(btree.get_first().unwrap_err().is_empty_tree());
}

#[test]
fn test_duplicate_insert_keeps_length() {
    let mut btree = BTree::new(2);
    let mut bplus = BPlusTree::new(2);
    assert_eq!(btree.insert("k", 1), None);
    assert_eq!(btree.insert("k", 2), Some(1));
    bplus.insert("k", 1);
    bplus.insert("k", 2);

    assert_eq!(btree.len(), 1);
    assert_eq!(bplus.len(), 1);
    assert_eq!(btree.search(&"k"), Some(&2));
    assert_eq!(bplus.search(&"k"), Some(&2));
}

#[test]
fn test_clear_then_reuse() {
    let mut tree = BPlusTree::new(2);
    for k in 0..100 {
        tree.insert(k, k);
    }
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.items().count(), 0);

    for k in 0..10 {
        tree.insert(k, k);
    }
    assert_eq!(tree.len(), 10);
    assert!(tree.check_invariants());
}
