//! Cypher-generation prompt assembly.
//!
//! Builds the prompt that asks a model to emit Cypher queries against the
//! instructional-task knowledge graph. The queries themselves are opaque
//! strings here; executing them is someone else's job.

use crate::signals::RenderedPredictions;

/// Neo4j schema description shown to the model.
const GRAPH_SCHEMA: &str = "\
Node properties:
Domain {name: STRING}
Task {name: STRING, taskid: INTEGER}
Step {name: STRING, stepid: INTEGER}
Action {name: STRING}
START {name: STRING}
END {name: STRING}
Object {name: STRING}
GroundedTool {name: STRING}
Purpose {name: STRING}
Relationship properties:
HAS_NEXT_STEP {tasks: LIST, vids: LIST, freq: INTEGER}
HAS_GROUNDED_TOOL {vids: LIST, freq: INTEGER}
HAS_SIMILAR_PURPOSE {sim: FLOAT}
The relationships:
(:Domain)-[:HAS_TASK]->(:Task)
(:Task)-[:HAS_STEP]->(:Step)
(:Task)-[:HAS_STEP]->(:END)
(:Task)-[:HAS_STEP]->(:START)
(:Step)-[:HAS_NEXT_STEP]->(:Step)
(:Step)-[:HAS_NEXT_STEP]->(:END)
(:Step)-[:HAS_ACTION]->(:Action)
(:Step)-[:HAS_GROUNDED_TOOL]->(:GroundedTool)
(:Step)-[:HAS_OBJECT]->(:Object)
(:Action)-[:HAS_PURPOSE]->(:Purpose)
(:START)-[:HAS_NEXT_STEP]->(:Step)
(:Object)-[:HAS_PURPOSE]->(:Purpose)
(:GroundedTool)-[:HAS_PURPOSE]->(:Purpose)
(:Purpose)-[:HAS_SIMILAR_PURPOSE]->(:Purpose)";

/// Worked example included when few-shot prompting is requested.
const WORKED_EXAMPLE: &str = r#"Example:
```
Top 5 task predictions: UnclogSinkWithBakingSoda (0.62), CleanBathtub (0.29), DrillHole (0.04), InstallShowerHead (0.03), MakeSlimeWithGlue (0.02)
Top 5 step predictions: clean bathtub with water (0.44), add baking soda to the sink hole (0.25), add hot water to the sink hole (0.12), apply detergent to bathtub (0.11), clean toys and hamster cages (0.08)
Question: What tool is suitable for this step?
Return only the python list of CYPHER queries.
CYPHER queries: ["MATCH (t:Task)-[r:HAS_STEP]->(n:Step)-[g:HAS_GROUNDED_TOOL]->(m:GroundedTool) WHERE t.name='UnclogSinkWithBakingSoda' and n.name = 'add baking soda to the sink hole' return m", "MATCH (t:Task)-[r:HAS_STEP]->(n:Step)-[g:HAS_GROUNDED_TOOL]->(m:GroundedTool) WHERE t.name='UnclogSinkWithBakingSoda' and n.name = 'add hot water to the sink hole' return m", "MATCH (t:Task)-[r:HAS_STEP]->(n:Step)-[g:HAS_GROUNDED_TOOL]->(m:GroundedTool) WHERE t.name='CleanBathtub' and n.name = 'clean bathtub with water' return m", "MATCH (t:Task)-[r:HAS_STEP]->(n:Step)-[g:HAS_GROUNDED_TOOL]->(m:GroundedTool) WHERE t.name='CleanBathtub' and n.name = 'apply detergent to bathtub' return m"]
```
"#;

/// Assembles the Cypher-generation prompt for one question.
///
/// `preds` should carry the full top-5 strings for both heads; `use_example`
/// adds the worked example between the schema and the real input.
pub fn assemble_cypher_prompt(
    question: &str,
    preds: &RenderedPredictions,
    use_example: bool,
) -> String {
    let example = if use_example { WORKED_EXAMPLE } else { "" };
    format!(
        "{}You are given the schema of a knowledge graph stored in Neo4j. Generate a list of CYPHER queries to retrieve information that can be used to answer the provided question. \n\
         The question is based on an instructional video, you are given the top five predictions of tasks and steps with their confident scores, predicted based on the video. \n\
         Schema: \n{}\n{}\n\
         REAL INPUT: \n\n\
         Top 5 task predictions: {}\n\
         Top 5 step predictions: {}\n\n\
         Question: {}\n\
         Return only the python list of CYPHER queries.\n\
         CYPHER queries:\n",
        super::VIDEO_TOKEN,
        GRAPH_SCHEMA,
        example,
        preds.task,
        preds.step,
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::RenderedPredictions;

    fn preds() -> RenderedPredictions {
        RenderedPredictions {
            task: "Make RJ45 Cable (0.8), Assemble Desktop PC (0.2)".to_string(),
            step: "crimp the cable (0.8), cut the cable (0.2)".to_string(),
        }
    }

    #[test]
    fn includes_schema_and_predictions() {
        let prompt = assemble_cypher_prompt("What tool is used?", &preds(), false);
        assert!(prompt.contains("(:Step)-[:HAS_GROUNDED_TOOL]->(:GroundedTool)"));
        assert!(prompt.contains("Top 5 task predictions: Make RJ45 Cable (0.8)"));
        assert!(prompt.contains("Question: What tool is used?"));
        assert!(!prompt.contains("Example:"));
    }

    #[test]
    fn example_is_optional() {
        let prompt = assemble_cypher_prompt("What tool is used?", &preds(), true);
        assert!(prompt.contains("Example:"));
        assert!(prompt.contains("CYPHER queries: [\"MATCH"));
    }
}
