/*!

This is the long-form manual for `ranked_choice` and `rctab`.

## Tabulation rules

The tabulation elects a single winner with instant-runoff voting.

1. Every candidate ranked on at least one ballot enters the race.
2. Each ballot counts for its highest-ranked candidate still in the race.
   A ballot whose candidates have all been eliminated is *exhausted* and
   counts for nobody.
3. A candidate with at least `floor(ballots / 2) + 1` votes wins. The
   number of ballots is the number of ballots cast, so exhausted ballots
   still count toward it. The threshold never changes between rounds.
4. If a single candidate is left without reaching the threshold, there is
   no winner.
5. Otherwise the candidate with the fewest votes is eliminated and the
   ballots are counted again.

### Ties

When several candidates share the fewest votes, the one with the lowest
Borda score is eliminated. The Borda score is computed once from the
ballots as cast: on a ballot ranking `L` candidates, the candidate at
position `p` (starting at 0) gets `L - p` points.

If the Borda scores are also equal, the candidate whose name comes last
in alphabetical order is eliminated.

For example, with the ballots `A`, `B` and `C` (one each), every round is
a tie: `C` is eliminated first, then `B`, and `A` is left with a single
vote out of three. This election has no winner.

## Input formats

### `csv`

Each row is a ballot. The choices start at the column given by
`firstVoteColumnIndex` (1 by default), in order of preference. Empty cells
are skipped.

```text
id,count,choice 1,choice 2,choice 3
id1,20,A,B,C
id2,15,B,,C
```

The `id` and `count` columns are optional and located with
`idColumnIndex` and `countColumnIndex`. The header row is expected unless
`hasHeaders` is set to `false`.

### `json`

A list of ballots:

```text
[
  { "id": "b1", "count": 20, "choices": ["A", "B", "C"] },
  { "choices": ["B", "C"] }
]
```

## Configuration

`rctab` accepts a configuration file in JSON:

```text
{
  "outputSettings": { "contestName": "Board 2024", "contestDate": "2024-05-01" },
  "ballotSource": {
    "provider": "csv",
    "filePath": "ballots.csv",
    "idColumnIndex": 1,
    "countColumnIndex": 2,
    "firstVoteColumnIndex": 3
  },
  "candidates": [ { "name": "A" }, { "name": "B" }, { "name": "C" } ]
}
```

The path of the ballot file is relative to the configuration file. When
candidates are listed, ballots ranking another candidate are rejected.
The `--input` and `--input-type` flags override the ballot source.
 */
