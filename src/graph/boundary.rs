// src/graph/boundary.rs
//! Unitig boundary predicates.
//!
//! A maximal unitig starts at a k-mer whose vertex branches on the side the
//! walk enters it through, or whose predecessor branches on the side the walk
//! leaves it by; ending is the mirror image. Branching is evaluated in the
//! vertex's canonical orientation, so the k-mer's orientation in the sequence
//! decides which side of its class is the entering one.

use crate::graph::state::{Dir, VertexClass};

/// Whether a unitig starts at the current k-mer, given its left neighbor in
/// the sequence walk.
#[inline]
pub fn is_unipath_start(
    class: VertexClass,
    dir: Dir,
    prev_class: VertexClass,
    prev_dir: Dir,
) -> bool {
    if class == VertexClass::MultiInMultiOut {
        return true;
    }

    match dir {
        Dir::Fwd => {
            if class == VertexClass::MultiInSingleOut {
                return true;
            }
        }
        Dir::Bwd => {
            if class == VertexClass::SingleInMultiOut {
                return true;
            }
        }
    }

    if prev_class == VertexClass::MultiInMultiOut {
        return true;
    }

    match prev_dir {
        Dir::Fwd => prev_class == VertexClass::SingleInMultiOut,
        Dir::Bwd => prev_class == VertexClass::MultiInSingleOut,
    }
}

/// Whether a unitig ends at the current k-mer, given its right neighbor in
/// the sequence walk.
#[inline]
pub fn is_unipath_end(
    class: VertexClass,
    dir: Dir,
    next_class: VertexClass,
    next_dir: Dir,
) -> bool {
    if class == VertexClass::MultiInMultiOut {
        return true;
    }

    match dir {
        Dir::Fwd => {
            if class == VertexClass::SingleInMultiOut {
                return true;
            }
        }
        Dir::Bwd => {
            if class == VertexClass::MultiInSingleOut {
                return true;
            }
        }
    }

    if next_class == VertexClass::MultiInMultiOut {
        return true;
    }

    match next_dir {
        Dir::Fwd => next_class == VertexClass::MultiInSingleOut,
        Dir::Bwd => next_class == VertexClass::SingleInMultiOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Whether a vertex of `class`, traversed with orientation `dir`, branches
    // on the side the walk enters it through.
    fn branches_entering(class: VertexClass, dir: Dir) -> bool {
        match dir {
            Dir::Fwd => matches!(
                class,
                VertexClass::MultiInSingleOut | VertexClass::MultiInMultiOut
            ),
            Dir::Bwd => matches!(
                class,
                VertexClass::SingleInMultiOut | VertexClass::MultiInMultiOut
            ),
        }
    }

    // Whether it branches on the side the walk leaves it by.
    fn branches_leaving(class: VertexClass, dir: Dir) -> bool {
        match dir {
            Dir::Fwd => matches!(
                class,
                VertexClass::SingleInMultiOut | VertexClass::MultiInMultiOut
            ),
            Dir::Bwd => matches!(
                class,
                VertexClass::MultiInSingleOut | VertexClass::MultiInMultiOut
            ),
        }
    }

    #[test]
    fn test_start_truth_table_exhaustive() {
        for class in VertexClass::ALL {
            for dir in [Dir::Fwd, Dir::Bwd] {
                for prev_class in VertexClass::ALL {
                    for prev_dir in [Dir::Fwd, Dir::Bwd] {
                        let expected = branches_entering(class, dir)
                            || branches_leaving(prev_class, prev_dir);
                        assert_eq!(
                            is_unipath_start(class, dir, prev_class, prev_dir),
                            expected,
                            "start({class:?},{dir:?},{prev_class:?},{prev_dir:?})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_end_truth_table_exhaustive() {
        for class in VertexClass::ALL {
            for dir in [Dir::Fwd, Dir::Bwd] {
                for next_class in VertexClass::ALL {
                    for next_dir in [Dir::Fwd, Dir::Bwd] {
                        let expected = branches_leaving(class, dir)
                            || branches_entering(next_class, next_dir);
                        assert_eq!(
                            is_unipath_end(class, dir, next_class, next_dir),
                            expected,
                            "end({class:?},{dir:?},{next_class:?},{next_dir:?})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_internal_vertices_do_not_break_a_unipath() {
        let internal = VertexClass::SingleInSingleOut;
        for dir in [Dir::Fwd, Dir::Bwd] {
            for other_dir in [Dir::Fwd, Dir::Bwd] {
                assert!(!is_unipath_start(internal, dir, internal, other_dir));
                assert!(!is_unipath_end(internal, dir, internal, other_dir));
            }
        }
    }

    #[test]
    fn test_start_end_symmetry_under_reversal() {
        // Ending a walk at (curr -> next) is starting the reversed walk at
        // (next -> curr) with both orientations flipped.
        let flip = |d| match d {
            Dir::Fwd => Dir::Bwd,
            Dir::Bwd => Dir::Fwd,
        };
        for class in VertexClass::ALL {
            for dir in [Dir::Fwd, Dir::Bwd] {
                for next_class in VertexClass::ALL {
                    for next_dir in [Dir::Fwd, Dir::Bwd] {
                        assert_eq!(
                            is_unipath_end(class, dir, next_class, next_dir),
                            is_unipath_start(
                                next_class,
                                flip(next_dir),
                                class,
                                flip(dir)
                            ),
                        );
                    }
                }
            }
        }
    }
}
