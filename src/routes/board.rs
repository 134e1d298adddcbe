use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{
    models::{BoardResponse, SpecialTileInfo},
    AppState,
};

/// Board layout for rendering clients
pub async fn get_board(State(state): State<Arc<AppState>>) -> Json<BoardResponse> {
    let board = state.engine.board();

    Json(BoardResponse {
        winning_score: board.winning_score(),
        special_tiles: board
            .special_tiles()
            .iter()
            .map(|(&position, &effect)| SpecialTileInfo { position, effect })
            .collect(),
        tiles: board.tiles(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::routes::test_support::{app, body_json, empty_request, test_state, StubGrader};

    #[tokio::test]
    async fn test_board_layout() {
        let state = test_state(Arc::new(StubGrader::awarding(5)));
        let resp = app(state)
            .oneshot(empty_request("GET", "/api/board"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp.into_body()).await;
        assert_eq!(json["winningScore"], 30);

        let special = json["specialTiles"].as_array().unwrap();
        let positions: Vec<u64> = special
            .iter()
            .map(|t| t["position"].as_u64().unwrap())
            .collect();
        assert_eq!(positions, vec![4, 11, 16, 22, 26]);
        assert_eq!(special[0]["effect"], "forward");
        assert_eq!(special[1]["effect"], "backward");

        let tiles = json["tiles"].as_array().unwrap();
        assert_eq!(tiles.len(), 31);
        assert_eq!(tiles[0]["kind"], "start");
        assert_eq!(tiles[0]["row"], 6);
        assert_eq!(tiles[0]["col"], 0);
        assert_eq!(tiles[30]["kind"], "finish");
    }
}
