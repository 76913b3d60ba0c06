use dashboard_core::{AggregateBucket, AppViewModel, RunPhase};
use serde_json::{json, Value};

/// Machine-readable form of a settled view.
pub fn render_json(view: &AppViewModel) -> Value {
    let status = match view.phase {
        RunPhase::Idle => "idle",
        RunPhase::Loading => "loading",
        RunPhase::Ready => "ready",
        RunPhase::Errored => "errored",
    };
    let movies: Vec<Value> = view
        .rows
        .iter()
        .map(|row| {
            json!({
                "title": row.title,
                "year": row.year,
                "rating": row.rating,
                "genre": row.genre,
            })
        })
        .collect();

    json!({
        "status": status,
        "error": view.error,
        "summary": {
            "total": view.summary.total,
            "average_rating": view.summary.average_rating,
            "movies_per_week": view.summary.movies_per_week,
            "movies_per_month": view.summary.movies_per_month,
        },
        "genres": buckets(&view.genres),
        "years": buckets(&view.years),
        "ratings": buckets(&view.ratings),
        "movies": movies,
    })
}

fn buckets(buckets: &[AggregateBucket]) -> Vec<Value> {
    buckets
        .iter()
        .map(|b| json!({ "key": b.key, "count": b.count }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::render_json;
    use dashboard_core::{update, AppState, MovieRecord, Msg, Trigger};
    use serde_json::json;

    #[test]
    fn ready_view_serializes_records_and_buckets() {
        let (state, _) = update(AppState::new(), Msg::LoadTriggered(Trigger::Mount));
        let run_id = state.active_run().unwrap();
        let (state, _) = update(
            state,
            Msg::RunCompleted {
                run_id,
                outcome: Ok(vec![MovieRecord::new(
                    "Inception",
                    "2010",
                    "Sci-Fi, Action",
                    "8.8",
                )]),
            },
        );

        let value = render_json(&state.view());

        assert_eq!(value["status"], "ready");
        assert_eq!(value["error"], json!(null));
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(
            value["genres"],
            json!([{ "key": "Sci-Fi", "count": 1 }, { "key": "Action", "count": 1 }])
        );
        assert_eq!(value["years"], json!([{ "key": "2010", "count": 1 }]));
        assert_eq!(value["movies"][0]["title"], "Inception");
    }
}
