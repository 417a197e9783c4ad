//! Problem categorization and strategic hints.
//!
//! Scores the problem text against keyword sets per algorithmic category and
//! emits guidance (key concepts, suggested algorithms, complexity targets)
//! that is folded into the solver's initial prompt. Pure data plus a scoring
//! pass; no state.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Graph,
    DynamicProgramming,
    Tree,
    StringAlgorithms,
    Array,
    Scheduling,
    Mathematical,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Graph => "Graph Algorithms",
            Category::DynamicProgramming => "Dynamic Programming",
            Category::Tree => "Tree & Binary Search",
            Category::StringAlgorithms => "String Algorithms",
            Category::Array => "Arrays & Two Pointers",
            Category::Scheduling => "Scheduling & Optimization",
            Category::Mathematical => "Mathematical Problems",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProblemAnalysis {
    pub category: Category,
    pub key_concepts: &'static [&'static str],
    pub suggested_algorithms: &'static [&'static str],
    pub time_complexity_target: &'static str,
    pub space_complexity_target: &'static str,
    pub common_pitfalls: &'static [&'static str],
}

struct CategoryProfile {
    category: Category,
    pattern: &'static str,
    key_concepts: &'static [&'static str],
    suggested_algorithms: &'static [&'static str],
    time_complexity_target: &'static str,
    space_complexity_target: &'static str,
    common_pitfalls: &'static [&'static str],
}

static PROFILES: &[CategoryProfile] = &[
    CategoryProfile {
        category: Category::Graph,
        pattern: r"\b(graph|node|edge|vertex|vertices|path|cycle|connected|component|adjacency|neighbor|directed|undirected|weighted|shortest path|dijkstra|bfs|dfs|topological|spanning tree)\b",
        key_concepts: &["Graph representation", "Traversal order", "Visited tracking"],
        suggested_algorithms: &["BFS/DFS", "Dijkstra", "Union-Find", "Topological sort"],
        time_complexity_target: "O(V + E)",
        space_complexity_target: "O(V + E)",
        common_pitfalls: &[
            "Forgetting to mark nodes visited",
            "Missing disconnected components",
            "Negative edge weights with Dijkstra",
        ],
    },
    CategoryProfile {
        category: Category::DynamicProgramming,
        pattern: r"\b(optimal|maximum|minimum|subsequence|knapsack|fibonacci|coin|edit distance|lcs|overlapping|subproblem|memoization|tabulation)\b",
        key_concepts: &["State definition", "Recurrence relation", "Base cases"],
        suggested_algorithms: &["Bottom-up DP", "Top-down DP with memoization"],
        time_complexity_target: "O(n\u{b2})",
        space_complexity_target: "O(n)",
        common_pitfalls: &[
            "Wrong base cases",
            "State that misses a dimension",
            "Recomputing subproblems",
        ],
    },
    CategoryProfile {
        category: Category::Tree,
        pattern: r"\b(tree|binary|bst|avl|heap|trie|segment|root|leaf|parent|child|ancestor|traversal|inorder|preorder|postorder)\b",
        key_concepts: &["Recursive structure", "Traversal order", "Balanced height"],
        suggested_algorithms: &["DFS traversals", "Level-order BFS", "BST operations"],
        time_complexity_target: "O(n)",
        space_complexity_target: "O(h) recursion depth",
        common_pitfalls: &[
            "Null/empty-tree edge cases",
            "Confusing inorder and preorder",
            "Unbalanced-tree worst cases",
        ],
    },
    CategoryProfile {
        category: Category::StringAlgorithms,
        pattern: r"\b(string|pattern|match|substring|palindrome|kmp|suffix|prefix|anagram|character|lexicographic)\b",
        key_concepts: &["Sliding window", "Character counting", "Prefix functions"],
        suggested_algorithms: &["Two pointers", "KMP", "Rolling hash"],
        time_complexity_target: "O(n + m)",
        space_complexity_target: "O(n)",
        common_pitfalls: &[
            "Off-by-one in window bounds",
            "Unicode vs byte indexing",
            "Empty string inputs",
        ],
    },
    CategoryProfile {
        category: Category::Array,
        pattern: r"\b(array|subarray|sliding window|two pointer|sort|merge|partition|binary search|rotation|duplicate|missing)\b",
        key_concepts: &["Invariants over a window", "Sorted-order exploitation"],
        suggested_algorithms: &["Binary search", "Two pointers", "Merge routines"],
        time_complexity_target: "O(n log n)",
        space_complexity_target: "O(1) extra",
        common_pitfalls: &[
            "Off-by-one in binary search bounds",
            "Mutating while iterating",
            "Overflow on index arithmetic",
        ],
    },
    CategoryProfile {
        category: Category::Scheduling,
        pattern: r"\b(task|job|schedule|deadline|priority|resource|worker|machine|processor|dependency|constraint|allocation)\b",
        key_concepts: &["Task dependencies", "Greedy choice ordering", "Critical path"],
        suggested_algorithms: &["Topological sort", "Greedy interval scheduling", "Priority queues"],
        time_complexity_target: "O(n log n)",
        space_complexity_target: "O(n)",
        common_pitfalls: &[
            "Unhandled circular dependencies",
            "Suboptimal greedy tie-breaking",
            "Ignoring resource limits",
        ],
    },
    CategoryProfile {
        category: Category::Mathematical,
        pattern: r"\b(prime|factor|gcd|lcm|modular|arithmetic|combinatorial|permutation|probability|number theory|geometry|matrix)\b",
        key_concepts: &["Modular arithmetic", "Closed-form shortcuts", "Precision limits"],
        suggested_algorithms: &["Sieve of Eratosthenes", "Fast exponentiation", "Euclid's GCD"],
        time_complexity_target: "O(n log n)",
        space_complexity_target: "O(n)",
        common_pitfalls: &[
            "Integer overflow",
            "Floating-point precision loss",
            "Missing modulo on intermediate results",
        ],
    },
];

fn compiled_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PROFILES
            .iter()
            .map(|p| Regex::new(p.pattern).unwrap())
            .collect()
    })
}

/// Score each category's keyword set against the problem text and return the
/// guidance for the best match. Ties resolve to the earlier profile; a text
/// matching nothing falls back to the array category.
pub fn analyze(problem_text: &str) -> ProblemAnalysis {
    let lower = problem_text.to_lowercase();
    let patterns = compiled_patterns();

    let mut best_idx = 4; // Array fallback
    let mut best_score = 0usize;
    for (idx, pattern) in patterns.iter().enumerate() {
        let score = pattern.find_iter(&lower).count();
        if score > best_score {
            best_score = score;
            best_idx = idx;
        }
    }

    let profile = &PROFILES[best_idx];
    ProblemAnalysis {
        category: profile.category,
        key_concepts: profile.key_concepts,
        suggested_algorithms: profile.suggested_algorithms,
        time_complexity_target: profile.time_complexity_target,
        space_complexity_target: profile.space_complexity_target,
        common_pitfalls: profile.common_pitfalls,
    }
}

/// Render the analysis as a prompt preamble for the solver's first turn.
pub fn render_guidance(analysis: &ProblemAnalysis, language: &str) -> String {
    format!(
        "PROBLEM ANALYSIS:\n\
         - Category: {}\n\
         - Language: {}\n\
         - Key concepts: {}\n\
         - Suggested algorithms: {}\n\
         - Complexity target: {} time, {} space\n\
         - Watch out for: {}",
        analysis.category.label(),
        language,
        analysis.key_concepts.join(", "),
        analysis.suggested_algorithms.join(", "),
        analysis.time_complexity_target,
        analysis.space_complexity_target,
        analysis.common_pitfalls.join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_problem_detected() {
        let analysis = analyze(
            "Given a directed graph with weighted edges, find the shortest path \
             from a source vertex to all other vertices.",
        );
        assert_eq!(analysis.category, Category::Graph);
    }

    #[test]
    fn test_dp_problem_detected() {
        let analysis = analyze(
            "Find the maximum value subsequence using the knapsack technique \
             with memoization of overlapping subproblems.",
        );
        assert_eq!(analysis.category, Category::DynamicProgramming);
    }

    #[test]
    fn test_scheduling_problem_detected() {
        let analysis = analyze(
            "Assign jobs to workers so that every task meets its deadline, \
             respecting dependency constraints between tasks.",
        );
        assert_eq!(analysis.category, Category::Scheduling);
    }

    #[test]
    fn test_unmatched_text_falls_back() {
        let analysis = analyze("please do the thing");
        assert_eq!(analysis.category, Category::Array);
    }

    #[test]
    fn test_guidance_mentions_category_and_language() {
        let analysis = analyze("shortest path in a graph");
        let guidance = render_guidance(&analysis, "Python");
        assert!(guidance.contains("Graph Algorithms"));
        assert!(guidance.contains("Python"));
    }
}
