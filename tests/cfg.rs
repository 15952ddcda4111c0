//! Control flow graph integration tests.
//!
//! These tests drive the public API only:
//! 1. Build a function from hand-written blocks
//! 2. Construct the control flow graph
//! 3. Check post-order, recorded edges and immediate dominators
//! 4. Query loop headers and declaration points
//!
//! The second half checks structural properties over a set of functions covering
//! straight-line code, diamonds, loops, nested loops, switches and dead code.

use std::collections::{HashSet, VecDeque};

use cfgscope::{
    analysis::{analyze_functions, CfgConfig, ControlFlowGraph, DominatorAccumulator},
    ir::{Block, BlockId, BlockLookup, Function, Merge},
    Error, Result,
};

fn b(id: u32) -> BlockId {
    BlockId::new(id)
}

/// `1 -> 2 -> 3`
fn linear() -> Function {
    Function::new(b(1))
        .with_block(b(1), Block::direct(b(2)))
        .with_block(b(2), Block::direct(b(3)))
        .with_block(b(3), Block::ret())
}

/// `1 -> {2, 3} -> 4`
fn diamond() -> Function {
    Function::new(b(1))
        .with_block(b(1), Block::select(b(2), b(3)))
        .with_block(b(2), Block::direct(b(4)))
        .with_block(b(3), Block::direct(b(4)))
        .with_block(b(4), Block::ret())
}

/// Header 1 branches into body 2, which jumps back. Nothing branches to merge block 3.
fn do_while_false() -> Function {
    Function::new(b(1))
        .with_block(b(1), Block::direct(b(2)).with_loop_merge(b(3)))
        .with_block(b(2), Block::direct(b(1)))
        .with_block(b(3), Block::ret())
}

/// `while (cond) { body }`:
///
/// ```text
/// 1 -> 2 (header, merge 5) -> 3 -> 4 (continue) -> 2
///      2 -> 5
/// ```
fn while_loop() -> Function {
    Function::new(b(1))
        .with_block(b(1), Block::direct(b(2)))
        .with_block(b(2), Block::select(b(3), b(5)).with_loop_merge(b(5)))
        .with_block(b(3), Block::direct(b(4)))
        .with_block(b(4), Block::direct(b(2)))
        .with_block(b(5), Block::ret())
}

/// Inner loop 3 (merge 6) nested in outer loop 2 (merge 8).
fn nested_loops() -> Function {
    Function::new(b(1))
        .with_block(b(1), Block::direct(b(2)))
        .with_block(b(2), Block::direct(b(3)).with_loop_merge(b(8)))
        .with_block(b(3), Block::direct(b(4)).with_loop_merge(b(6)))
        .with_block(b(4), Block::direct(b(5)))
        .with_block(b(5), Block::select(b(3), b(6)))
        .with_block(b(6), Block::select(b(7), b(8)))
        .with_block(b(7), Block::direct(b(2)))
        .with_block(b(8), Block::ret())
}

/// A switch whose case 3 falls through into case 4.
fn switch_with_fallthrough() -> Function {
    Function::new(b(1))
        .with_block(
            b(1),
            Block::multi_select(&[b(2), b(3), b(4)], Some(b(5))).with_selection_merge(b(5)),
        )
        .with_block(b(2), Block::direct(b(5)))
        .with_block(b(3), Block::direct(b(4)))
        .with_block(b(4), Block::direct(b(5)))
        .with_block(b(5), Block::ret())
}

/// Linear code with two dead blocks branching into it.
fn with_dead_code() -> Function {
    linear()
        .with_block(b(9), Block::direct(b(3)))
        .with_block(b(10), Block::select(b(9), b(2)))
}

fn all_functions() -> Vec<Function> {
    vec![
        linear(),
        diamond(),
        do_while_false(),
        while_loop(),
        nested_loops(),
        switch_with_fallthrough(),
        with_dead_code(),
    ]
}

/// Blocks reachable from the entry through branches and loop merge links.
fn reachable(function: &Function) -> HashSet<BlockId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([function.entry_block()]);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        let block = function.block(id).unwrap();
        queue.extend(block.successors());
        if let Merge::Loop { merge_block } = block.merge {
            queue.push_back(merge_block);
        }
    }
    seen
}

#[test]
fn linear_chain() -> Result<()> {
    let function = linear();
    let cfg = ControlFlowGraph::new(&function)?;

    assert_eq!(cfg.immediate_dominator(b(3)), Some(b(2)));
    assert_eq!(cfg.immediate_dominator(b(2)), Some(b(1)));
    assert_eq!(cfg.immediate_dominator(b(1)), Some(b(1)));
    assert_eq!(cfg.post_order(), &[b(3), b(2), b(1)]);
    Ok(())
}

#[test]
fn diamond_reconverges_at_branch() -> Result<()> {
    let function = diamond();
    let cfg = ControlFlowGraph::new(&function)?;

    assert_eq!(cfg.find_common_dominator(b(2), b(3))?, b(1));
    assert_eq!(cfg.immediate_dominator(b(4)), Some(b(1)));
    assert_eq!(cfg.post_order(), &[b(4), b(2), b(3), b(1)]);
    Ok(())
}

#[test]
fn loop_merge_reached_through_header() -> Result<()> {
    let function = do_while_false();
    let cfg = ControlFlowGraph::new(&function)?;

    assert_eq!(cfg.succeeding_edges(b(1)), &[b(2), b(3)]);
    assert_eq!(cfg.loop_merge_edges(), &[(b(1), b(3))]);
    assert_eq!(cfg.immediate_dominator(b(3)), Some(b(1)));

    assert_eq!(cfg.back_edges(), &[(b(2), b(1))]);
    assert!(cfg.preceding_edges(b(1)).is_empty());
    assert!(!cfg.succeeding_edges(b(2)).contains(&b(1)));
    Ok(())
}

#[test]
fn literal_config_leaves_merge_unreachable() -> Result<()> {
    let function = do_while_false();
    let cfg = ControlFlowGraph::with_config(&function, CfgConfig::literal())?;

    assert!(!cfg.is_reachable(b(3)));
    assert_eq!(cfg.immediate_dominator(b(3)), None);
    assert_eq!(cfg.succeeding_edges(b(1)), &[b(2)]);
    Ok(())
}

#[test]
fn continue_block_dominator_lifted_to_entry() -> Result<()> {
    let function = while_loop();
    let cfg = ControlFlowGraph::new(&function)?;

    // 4 jumps back to the header, which finished later.
    assert!(cfg.visit_order(b(2)) > cfg.visit_order(b(4)));

    let mut accumulator = DominatorAccumulator::new(&cfg);
    accumulator.add_block(b(4))?;
    accumulator.lift_continue_block_dominator()?;
    assert_eq!(accumulator.dominator(), Some(cfg.entry_block()));
    Ok(())
}

#[test]
fn loop_body_dominator_kept() -> Result<()> {
    let function = while_loop();
    let cfg = ControlFlowGraph::new(&function)?;

    let mut accumulator = DominatorAccumulator::new(&cfg);
    accumulator.add_blocks([b(3), b(4)])?;
    accumulator.lift_continue_block_dominator()?;
    assert_eq!(accumulator.dominator(), Some(b(3)));
    Ok(())
}

#[test]
fn use_after_loop_declared_at_header() -> Result<()> {
    let function = nested_loops();
    let cfg = ControlFlowGraph::new(&function)?;

    let mut accumulator = DominatorAccumulator::new(&cfg);
    accumulator.add_blocks([b(4), b(8)])?;
    accumulator.lift_continue_block_dominator()?;
    assert_eq!(accumulator.dominator(), Some(b(2)));
    Ok(())
}

#[test]
fn nested_loop_headers() -> Result<()> {
    let function = nested_loops();
    let cfg = ControlFlowGraph::new(&function)?;

    assert_eq!(cfg.find_loop_dominator(b(1))?, None);
    assert_eq!(cfg.find_loop_dominator(b(2))?, None);
    assert_eq!(cfg.find_loop_dominator(b(3))?, Some(b(2)));
    assert_eq!(cfg.find_loop_dominator(b(4))?, Some(b(3)));
    assert_eq!(cfg.find_loop_dominator(b(5))?, Some(b(3)));
    assert_eq!(cfg.find_loop_dominator(b(6))?, Some(b(2)));
    assert_eq!(cfg.find_loop_dominator(b(7))?, Some(b(2)));
    assert_eq!(cfg.find_loop_dominator(b(8))?, None);
    Ok(())
}

#[test]
fn switch_records_crossing_edges() -> Result<()> {
    let function = switch_with_fallthrough();
    let cfg = ControlFlowGraph::new(&function)?;

    assert_eq!(cfg.succeeding_edges(b(1)), &[b(2), b(3), b(4), b(5)]);
    assert_eq!(cfg.preceding_edges(b(4)), &[b(3), b(1)]);
    assert_eq!(cfg.preceding_edges(b(5)), &[b(2), b(4), b(1)]);
    assert!(cfg.back_edges().is_empty());

    assert_eq!(cfg.immediate_dominator(b(4)), Some(b(1)));
    assert_eq!(cfg.immediate_dominator(b(5)), Some(b(1)));
    assert_eq!(cfg.find_loop_dominator(b(4))?, None);
    Ok(())
}

#[test]
fn dead_code_is_ignored() -> Result<()> {
    let function = with_dead_code();
    let cfg = ControlFlowGraph::new(&function)?;

    assert_eq!(cfg.block_count(), 3);
    assert!(!cfg.is_reachable(b(9)));
    assert_eq!(cfg.visit_order(b(10)), None);
    assert_eq!(cfg.preceding_edges(b(3)), &[b(2)]);
    assert_eq!(
        cfg.find_common_dominator(b(3), b(10)),
        Err(Error::UnreachableBlock(b(10)))
    );

    let mut accumulator = DominatorAccumulator::new(&cfg);
    accumulator.add_blocks([b(9), b(3), b(10)])?;
    assert_eq!(accumulator.dominator(), Some(b(3)));
    Ok(())
}

#[test]
fn missing_branch_target() {
    let function = linear().with_block(b(3), Block::direct(b(4)));
    let result = ControlFlowGraph::new(&function);
    assert!(matches!(result, Err(Error::UnknownBlock(id)) if id == b(4)));
}

#[test]
fn batch_matches_single_builds() -> Result<()> {
    let functions = all_functions();
    let results = analyze_functions(&functions, CfgConfig::default());

    for (function, result) in functions.iter().zip(results) {
        let batched = result?;
        let single = ControlFlowGraph::new(function)?;
        assert_eq!(batched.post_order(), single.post_order());
        for &block in single.post_order() {
            assert_eq!(
                batched.immediate_dominator(block),
                single.immediate_dominator(block)
            );
        }
    }
    Ok(())
}

#[test]
fn post_order_is_complete_and_monotonic() -> Result<()> {
    for function in all_functions() {
        let cfg = ControlFlowGraph::new(&function)?;
        let post_order = cfg.post_order();

        let unique: HashSet<BlockId> = post_order.iter().copied().collect();
        assert_eq!(unique.len(), post_order.len());
        assert_eq!(unique, reachable(&function));

        for (index, &block) in post_order.iter().enumerate() {
            assert_eq!(cfg.visit_order(block), Some(index as u32 + 1));
        }
        assert_eq!(post_order.last(), Some(&function.entry_block()));
    }
    Ok(())
}

#[test]
fn dominator_chains_reach_entry() -> Result<()> {
    for function in all_functions() {
        let cfg = ControlFlowGraph::new(&function)?;
        let entry = cfg.entry_block();

        for &block in cfg.post_order() {
            let chain: Vec<BlockId> = cfg.dominators(block).collect();
            assert!(chain.len() <= cfg.block_count());
            assert_eq!(chain.last(), Some(&entry));
            for pair in chain.windows(2) {
                assert!(cfg.visit_order(pair[0]) < cfg.visit_order(pair[1]));
            }
        }
    }
    Ok(())
}

#[test]
fn common_dominator_is_nearest_shared_ancestor() -> Result<()> {
    for function in all_functions() {
        let cfg = ControlFlowGraph::new(&function)?;

        for &a in cfg.post_order() {
            for &other in cfg.post_order() {
                let common = cfg.find_common_dominator(a, other)?;
                assert!(cfg.dominates(common, a));
                assert!(cfg.dominates(common, other));
                assert_eq!(cfg.find_common_dominator(other, a)?, common);

                // Every other shared dominator sits above the result.
                for shared in cfg.dominators(a).filter(|&d| cfg.dominates(d, other)) {
                    assert!(cfg.dominates(shared, common));
                }
            }
        }
    }
    Ok(())
}

#[test]
fn recorded_edges_are_acyclic() -> Result<()> {
    for function in all_functions() {
        let cfg = ControlFlowGraph::new(&function)?;

        for &from in cfg.post_order() {
            for &to in cfg.succeeding_edges(from) {
                assert!(cfg.visit_order(to) < cfg.visit_order(from));
                assert!(cfg.preceding_edges(to).contains(&from));
            }
        }
        for &(from, to) in cfg.back_edges() {
            assert!(cfg.visit_order(to) >= cfg.visit_order(from));
            assert!(!cfg.succeeding_edges(from).contains(&to));
        }
    }
    Ok(())
}

#[test]
fn accumulator_only_widens() -> Result<()> {
    for function in all_functions() {
        let cfg = ControlFlowGraph::new(&function)?;
        let mut accumulator = DominatorAccumulator::new(&cfg);
        let mut added = Vec::new();

        for &block in cfg.post_order() {
            let before = accumulator.dominator();
            accumulator.add_block(block)?;
            added.push(block);

            let Some(dominator) = accumulator.dominator() else {
                panic!("reachable block {block} left the accumulator empty");
            };
            for &previous in &added {
                assert!(cfg.dominates(dominator, previous));
            }
            if let Some(before) = before {
                assert!(cfg.visit_order(dominator) >= cfg.visit_order(before));
            }

            // Re-adding an already covered block is a no-op.
            accumulator.add_block(block)?;
            assert_eq!(accumulator.dominator(), Some(dominator));
        }
    }
    Ok(())
}
